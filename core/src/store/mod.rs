//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The engine and orchestrator see the store only through the
//! collaborator traits in ledger.rs; they never execute SQL directly.

mod assignment;
mod decision_log;
mod roster;
mod task;

pub use assignment::QueuedNotification;

use crate::error::{MatchError, MatchResult};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub struct LedgerStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl LedgerStore {
    pub fn open(path: &str) -> MatchResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> MatchResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Open, migrate, done. Convenience for tests and the runner.
    pub fn in_memory_migrated() -> MatchResult<Self> {
        let store = Self::in_memory()?;
        store.migrate()?;
        Ok(store)
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> MatchResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Safe to call repeatedly.
    pub fn migrate(&self) -> MatchResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_roster.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_assignments.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_decision_log.sql"))?;
        Ok(())
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> MatchResult<i64> {
        Ok(self.conn.query_row(sql, params, |r| r.get(0))?)
    }
}

// ── Column helpers ──────────────────────────────────────────────

fn to_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

fn parse_timestamp(raw: &str) -> MatchResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MatchError::Other(anyhow::anyhow!("bad timestamp '{raw}': {e}")))
}
