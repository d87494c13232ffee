//! Decision log events.
//!
//! One event is recorded per matching decision. Payloads are stored as
//! JSON in `decision_log`, so variants are only ever appended.

use crate::types::{AssignmentId, TaskId, WorkerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    MatchSelected {
        task_id: TaskId,
        worker_id: WorkerId,
        score: f64,
        degraded_factors: Vec<String>,
    },
    NoMatch {
        task_id: TaskId,
        reason: String,
    },
    AssignmentCreated {
        task_id: TaskId,
        worker_id: WorkerId,
        assignment_id: AssignmentId,
        assigned_by: String,
    },
}

impl MatchEvent {
    /// Stable name for the `event_type` column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MatchSelected { .. } => "match_selected",
            Self::NoMatch { .. } => "no_match",
            Self::AssignmentCreated { .. } => "assignment_created",
        }
    }

    pub fn task_id(&self) -> &str {
        match self {
            Self::MatchSelected { task_id, .. }
            | Self::NoMatch { task_id, .. }
            | Self::AssignmentCreated { task_id, .. } => task_id,
        }
    }
}

/// A row of the decision log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub id: Option<i64>,
    pub task_id: TaskId,
    pub event_type: String,
    pub payload: String,
    pub recorded_at: String,
}
