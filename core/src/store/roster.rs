//! Worker roster queries.

use super::LedgerStore;
use crate::{
    error::{MatchError, MatchResult},
    ledger::WorkerDirectory,
    worker::Worker,
};
use rusqlite::{params, OptionalExtension};

const WORKER_COLUMNS: &str = "worker_id, name, email, department, skills, available";

fn worker_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Worker> {
    Ok(Worker {
        worker_id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        department: r.get(3)?,
        raw_skills: r.get(4)?,
        available: r.get::<_, i32>(5)? != 0,
    })
}

impl LedgerStore {
    pub fn insert_worker(&self, w: &Worker) -> MatchResult<()> {
        self.conn.execute(
            "INSERT INTO worker (worker_id, name, email, department, skills, available)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &w.worker_id,
                &w.name,
                &w.email,
                &w.department,
                &w.raw_skills,
                if w.available { 1 } else { 0 }
            ],
        )?;
        Ok(())
    }

    pub fn get_worker(&self, worker_id: &str) -> MatchResult<Worker> {
        self.conn
            .query_row(
                &format!("SELECT {WORKER_COLUMNS} FROM worker WHERE worker_id = ?1"),
                params![worker_id],
                worker_from_row,
            )
            .optional()?
            .ok_or_else(|| MatchError::WorkerNotFound {
                worker_id: worker_id.to_string(),
            })
    }

    pub fn set_availability(&self, worker_id: &str, available: bool) -> MatchResult<()> {
        let changed = self.conn.execute(
            "UPDATE worker SET available = ?1 WHERE worker_id = ?2",
            params![if available { 1 } else { 0 }, worker_id],
        )?;
        if changed == 0 {
            return Err(MatchError::WorkerNotFound {
                worker_id: worker_id.to_string(),
            });
        }
        Ok(())
    }

    /// All workers in insertion order, available or not.
    pub fn all_workers(&self) -> MatchResult<Vec<Worker>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {WORKER_COLUMNS} FROM worker ORDER BY rowid"))?;
        let rows = stmt.query_map([], worker_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn worker_count(&self) -> MatchResult<i64> {
        self.count("SELECT COUNT(*) FROM worker", [])
    }
}

impl WorkerDirectory for LedgerStore {
    fn list_available_workers(&self) -> MatchResult<Vec<Worker>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORKER_COLUMNS} FROM worker WHERE available = 1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map([], worker_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
