//! Task queries.

use super::{parse_timestamp, to_timestamp, LedgerStore};
use crate::{
    error::{MatchError, MatchResult},
    task::{Priority, TaskRecord, TaskStatus},
};
use rusqlite::{params, OptionalExtension};

type RawTask = (String, String, String, String, String, Option<f64>, Option<String>, String);

impl LedgerStore {
    pub fn insert_task(&self, t: &TaskRecord) -> MatchResult<()> {
        self.conn.execute(
            "INSERT INTO task (task_id, title, description, priority, source,
                               estimated_hours, due_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &t.task_id,
                &t.title,
                &t.description,
                t.priority.as_str(),
                &t.source,
                t.estimated_hours,
                t.due_date.as_ref().map(to_timestamp),
                t.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, task_id: &str) -> MatchResult<TaskRecord> {
        let raw: Option<RawTask> = self
            .conn
            .query_row(
                "SELECT task_id, title, description, priority, source,
                        estimated_hours, due_date, status
                 FROM task WHERE task_id = ?1",
                params![task_id],
                |r| {
                    Ok((
                        r.get(0)?,
                        r.get(1)?,
                        r.get(2)?,
                        r.get(3)?,
                        r.get(4)?,
                        r.get(5)?,
                        r.get(6)?,
                        r.get(7)?,
                    ))
                },
            )
            .optional()?;
        let (task_id, title, description, priority, source, estimated_hours, due_date, status) =
            raw.ok_or_else(|| MatchError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;

        Ok(TaskRecord {
            status: TaskStatus::parse(&status).ok_or_else(|| {
                MatchError::Other(anyhow::anyhow!("task {task_id} has unknown status '{status}'"))
            })?,
            task_id,
            title,
            description,
            priority: Priority::parse(&priority),
            source,
            estimated_hours,
            due_date: due_date.as_deref().map(parse_timestamp).transpose()?,
        })
    }

    pub fn task_count(&self, status: TaskStatus) -> MatchResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM task WHERE status = ?1",
            params![status.as_str()],
        )
    }
}

pub(super) fn set_task_status(
    conn: &rusqlite::Connection,
    task_id: &str,
    status: TaskStatus,
) -> MatchResult<()> {
    let changed = conn.execute(
        "UPDATE task SET status = ?1 WHERE task_id = ?2",
        params![status.as_str(), task_id],
    )?;
    if changed == 0 {
        return Err(MatchError::TaskNotFound {
            task_id: task_id.to_string(),
        });
    }
    Ok(())
}
