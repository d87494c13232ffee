//! Assignment records, their lifecycle, and ledger summaries.

use crate::{
    error::{MatchError, MatchResult},
    task::Priority,
    types::{AssignmentId, TaskId, WorkerId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assignment lifecycle:
///
/// ```text
/// assigned ──► accepted ──► completed
///    │            └───────► cancelled
///    ├──────► declined
///    └──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Accepted,
    Declined,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> MatchResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "assigned" => Ok(Self::Assigned),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(anyhow::anyhow!("unknown assignment status '{other}'").into()),
        }
    }

    /// Active assignments count toward a worker's workload.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Assigned | Self::Accepted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, next),
            (Assigned, Accepted)
                | (Assigned, Declined)
                | (Assigned, Cancelled)
                | (Accepted, Completed)
                | (Accepted, Cancelled)
        )
    }

    pub fn transition_to(&self, next: AssignmentStatus) -> MatchResult<AssignmentStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(MatchError::InvalidTransition {
                entity: "assignment",
                from: self.as_str().into(),
                to: next.as_str().into(),
            })
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which decision path picked the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionPath {
    /// The scoring engine's best match.
    DirectMatch,
    /// A secondary decision process invoked after the engine found no match.
    Fallback { strategy: String },
}

impl SelectionPath {
    pub fn fallback(strategy: impl Into<String>) -> Self {
        Self::Fallback { strategy: strategy.into() }
    }

    /// Provenance tag stored in `assigned_by`.
    pub fn assigned_by(&self) -> String {
        match self {
            Self::DirectMatch => "matcher".into(),
            Self::Fallback { strategy } => format!("fallback:{strategy}"),
        }
    }
}

/// One task linked to one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub assignment_id: AssignmentId,
    pub task_id: TaskId,
    pub worker_id: WorkerId,
    pub assigned_by: String,
    pub path: SelectionPath,
    pub status: AssignmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Outbound message handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub task_title: String,
    pub task_description: String,
}

impl NotificationPayload {
    pub fn task_assigned(recipient: &str, title: &str, description: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: format!("New Task Assignment: {title}"),
            body: format!(
                "You have been assigned a new task:\n\n\
                 Title: {title}\n\
                 Description: {description}\n\n\
                 Please log into the task management system to view details \
                 and update the status."
            ),
            task_title: title.to_string(),
            task_description: description.to_string(),
        }
    }
}

/// Ledger view of one assignment together with the task facts the
/// scoring factors need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub task_id: TaskId,
    pub task_estimated_hours: Option<f64>,
    pub task_priority: Priority,
    pub task_source: String,
    pub status: AssignmentStatus,
}
