//! Decision log queries.

use super::{to_timestamp, LedgerStore};
use crate::{
    error::MatchResult,
    event::{DecisionLogEntry, MatchEvent},
};
use chrono::Utc;
use rusqlite::params;

impl LedgerStore {
    pub fn append_decision(&self, event: &MatchEvent) -> MatchResult<()> {
        self.conn.execute(
            "INSERT INTO decision_log (task_id, event_type, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                event.task_id(),
                event.type_name(),
                serde_json::to_string(event)?,
                to_timestamp(&Utc::now()),
            ],
        )?;
        Ok(())
    }

    pub fn decisions_for_task(&self, task_id: &str) -> MatchResult<Vec<DecisionLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, event_type, payload, recorded_at
             FROM decision_log WHERE task_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![task_id], |row| {
                Ok(DecisionLogEntry {
                    id: Some(row.get(0)?),
                    task_id: row.get(1)?,
                    event_type: row.get(2)?,
                    payload: row.get(3)?,
                    recorded_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Decode the logged events for a task.
    pub fn events_for_task(&self, task_id: &str) -> MatchResult<Vec<MatchEvent>> {
        self.decisions_for_task(task_id)?
            .iter()
            .map(|e| serde_json::from_str(&e.payload).map_err(Into::into))
            .collect()
    }

    pub fn decision_count(&self, event_type: &str) -> MatchResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM decision_log WHERE event_type = ?1",
            params![event_type],
        )
    }
}
