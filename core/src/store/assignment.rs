//! Assignment ledger, commit hand-off and notification outbox.

use super::{parse_timestamp, task::set_task_status, to_timestamp, LedgerStore};
use crate::{
    assignment::{
        AssignmentRecord, AssignmentStatus, AssignmentSummary, NotificationPayload, SelectionPath,
    },
    error::{MatchError, MatchResult},
    event::MatchEvent,
    ledger::{AssignmentLedger, AssignmentSink},
    task::{Priority, TaskStatus},
};
use rusqlite::{params, OptionalExtension};

/// Notification waiting in the outbox for the delivery collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedNotification {
    pub id: i64,
    pub assignment_id: String,
    pub payload: NotificationPayload,
}

struct RawAssignment {
    assignment_id: String,
    task_id: String,
    worker_id: String,
    assigned_by: String,
    path: String,
    status: String,
    notes: String,
    created_at: String,
}

impl RawAssignment {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            assignment_id: r.get(0)?,
            task_id: r.get(1)?,
            worker_id: r.get(2)?,
            assigned_by: r.get(3)?,
            path: r.get(4)?,
            status: r.get(5)?,
            notes: r.get(6)?,
            created_at: r.get(7)?,
        })
    }

    fn into_record(self) -> MatchResult<AssignmentRecord> {
        Ok(AssignmentRecord {
            path: serde_json::from_str::<SelectionPath>(&self.path)?,
            status: AssignmentStatus::parse(&self.status)?,
            created_at: parse_timestamp(&self.created_at)?,
            assignment_id: self.assignment_id,
            task_id: self.task_id,
            worker_id: self.worker_id,
            assigned_by: self.assigned_by,
            notes: self.notes,
        })
    }
}

const ASSIGNMENT_COLUMNS: &str =
    "assignment_id, task_id, worker_id, assigned_by, path, status, notes, created_at";

fn insert_assignment_row(conn: &rusqlite::Connection, a: &AssignmentRecord) -> MatchResult<()> {
    conn.execute(
        "INSERT INTO assignment (assignment_id, task_id, worker_id, assigned_by, path,
                                 status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &a.assignment_id,
            &a.task_id,
            &a.worker_id,
            &a.assigned_by,
            serde_json::to_string(&a.path)?,
            a.status.as_str(),
            &a.notes,
            to_timestamp(&a.created_at),
        ],
    )?;
    Ok(())
}

impl LedgerStore {
    /// Insert a ledger row as-is, without touching the task or the outbox.
    /// Used to load historical assignments.
    pub fn insert_assignment(&self, a: &AssignmentRecord) -> MatchResult<()> {
        insert_assignment_row(&self.conn, a)
    }

    pub fn get_assignment(&self, assignment_id: &str) -> MatchResult<Option<AssignmentRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignment WHERE assignment_id = ?1"),
                params![assignment_id],
                RawAssignment::from_row,
            )
            .optional()?
            .map(RawAssignment::into_record)
            .transpose()
    }

    pub fn assignments_for_task(&self, task_id: &str) -> MatchResult<Vec<AssignmentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignment WHERE task_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt
            .query_map(params![task_id], RawAssignment::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawAssignment::into_record).collect()
    }

    /// Move an assignment along its lifecycle. Declined or cancelled
    /// assignments release the task; completed ones close it.
    pub fn update_assignment_status(
        &self,
        assignment_id: &str,
        next: AssignmentStatus,
    ) -> MatchResult<AssignmentStatus> {
        let tx = self.conn.unchecked_transaction()?;
        let (task_id, current): (String, String) = tx
            .query_row(
                "SELECT task_id, status FROM assignment WHERE assignment_id = ?1",
                params![assignment_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| {
                MatchError::Other(anyhow::anyhow!("assignment '{assignment_id}' not found"))
            })?;

        let next = AssignmentStatus::parse(&current)?.transition_to(next)?;
        tx.execute(
            "UPDATE assignment SET status = ?1 WHERE assignment_id = ?2",
            params![next.as_str(), assignment_id],
        )?;
        match next {
            AssignmentStatus::Declined | AssignmentStatus::Cancelled => {
                set_task_status(&tx, &task_id, TaskStatus::Unassigned)?
            }
            AssignmentStatus::Completed => set_task_status(&tx, &task_id, TaskStatus::Closed)?,
            AssignmentStatus::Assigned | AssignmentStatus::Accepted => {}
        }
        tx.commit()?;
        Ok(next)
    }

    pub fn active_assignment_count(&self, worker_id: &str) -> MatchResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM assignment
             WHERE worker_id = ?1 AND status IN ('assigned', 'accepted')",
            params![worker_id],
        )
    }

    pub fn assignment_count(&self) -> MatchResult<i64> {
        self.count("SELECT COUNT(*) FROM assignment", [])
    }

    // ── Outbox ─────────────────────────────────────────────────

    pub fn pending_notifications(&self) -> MatchResult<Vec<QueuedNotification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, assignment_id, recipient, subject, body, task_title, task_description
             FROM notification_outbox WHERE sent = 0 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(QueuedNotification {
                id: r.get(0)?,
                assignment_id: r.get(1)?,
                payload: NotificationPayload {
                    recipient: r.get(2)?,
                    subject: r.get(3)?,
                    body: r.get(4)?,
                    task_title: r.get(5)?,
                    task_description: r.get(6)?,
                },
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn mark_notification_sent(&self, id: i64) -> MatchResult<()> {
        self.conn.execute(
            "UPDATE notification_outbox SET sent = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}

impl AssignmentLedger for LedgerStore {
    fn assignment_history(&self, worker_id: &str) -> MatchResult<Vec<AssignmentSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.task_id, t.estimated_hours, t.priority, t.source, a.status
             FROM assignment a
             JOIN task t ON t.task_id = a.task_id
             WHERE a.worker_id = ?1
             ORDER BY a.rowid",
        )?;
        let rows = stmt
            .query_map(params![worker_id], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<f64>>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(task_id, hours, priority, source, status)| {
                let status = AssignmentStatus::parse(&status).map_err(|e| MatchError::Ledger {
                    worker_id: worker_id.to_string(),
                    reason: format!("task {task_id}: {e}"),
                })?;
                Ok(AssignmentSummary {
                    task_id,
                    task_estimated_hours: hours,
                    task_priority: Priority::parse(&priority),
                    task_source: source,
                    status,
                })
            })
            .collect()
    }
}

impl AssignmentSink for LedgerStore {
    fn commit(&self, record: &AssignmentRecord, notification: &NotificationPayload) -> MatchResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        // Claim the task first: only an unassigned task may be assigned.
        let claimed = tx.execute(
            "UPDATE task SET status = 'assigned' WHERE task_id = ?1 AND status = 'unassigned'",
            params![&record.task_id],
        )?;
        if claimed == 0 {
            let current: Option<String> = tx
                .query_row(
                    "SELECT status FROM task WHERE task_id = ?1",
                    params![&record.task_id],
                    |r| r.get(0),
                )
                .optional()?;
            return Err(match current {
                Some(from) => MatchError::InvalidTransition {
                    entity: "task",
                    from,
                    to: TaskStatus::Assigned.as_str().into(),
                },
                None => MatchError::TaskNotFound {
                    task_id: record.task_id.clone(),
                },
            });
        }

        insert_assignment_row(&tx, record)?;
        tx.execute(
            "INSERT INTO notification_outbox (assignment_id, recipient, subject, body,
                                              task_title, task_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &record.assignment_id,
                &notification.recipient,
                &notification.subject,
                &notification.body,
                &notification.task_title,
                &notification.task_description,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn record_event(&self, event: &MatchEvent) -> MatchResult<()> {
        self.append_decision(event)
    }
}
