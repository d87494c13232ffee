//! Workload aggregation from the assignment ledger.
//!
//! Recomputed for every matching call. Nothing here is cached across
//! calls: the ledger snapshot is expected to be fresh per decision.

use crate::{
    assignment::AssignmentSummary,
    ledger::AssignmentLedger,
    task::Priority,
};
use serde::{Deserialize, Serialize};

/// A worker's active load at the moment of matching.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    pub active_task_count: u32,
    pub active_estimated_hours: f64,
}

impl WorkloadSnapshot {
    pub fn new(active_task_count: u32, active_estimated_hours: f64) -> Self {
        Self { active_task_count, active_estimated_hours }
    }

    /// Aggregate active (`assigned`/`accepted`) assignments.
    /// Missing estimates count as 0 hours. A negative or non-finite
    /// estimate is a data fault and fails the aggregation.
    pub fn from_summaries(summaries: &[AssignmentSummary]) -> Result<Self, String> {
        let mut snapshot = Self::default();
        for a in summaries.iter().filter(|a| a.status.is_active()) {
            let hours = a.task_estimated_hours.unwrap_or(0.0);
            if !hours.is_finite() || hours < 0.0 {
                return Err(format!(
                    "task {} has invalid estimated hours {hours}",
                    a.task_id
                ));
            }
            snapshot.active_task_count += 1;
            snapshot.active_estimated_hours += hours;
        }
        Ok(snapshot)
    }
}

/// One worker's assignment history, fetched once per matching call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerView {
    history: Vec<AssignmentSummary>,
}

impl LedgerView {
    pub fn new(history: Vec<AssignmentSummary>) -> Self {
        Self { history }
    }

    pub fn workload(&self) -> Result<WorkloadSnapshot, String> {
        WorkloadSnapshot::from_summaries(&self.history)
    }

    /// Active assignments whose task is itself high priority.
    pub fn active_high_priority_count(&self) -> usize {
        self.history
            .iter()
            .filter(|a| a.status.is_active() && a.task_priority == Priority::High)
            .count()
    }

    /// Past assignments (any status) whose task source tag contains
    /// `task_type`, compared case-insensitively.
    pub fn type_experience_count(&self, task_type: &str) -> usize {
        let needle = task_type.trim().to_lowercase();
        if needle.is_empty() {
            return 0;
        }
        self.history
            .iter()
            .filter(|a| a.task_source.to_lowercase().contains(&needle))
            .count()
    }
}

/// Ledger data for one candidate, or the reason it could not be read.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerState {
    Loaded(LedgerView),
    Unavailable { reason: String },
}

impl LedgerState {
    /// Fetch `worker_id`'s history. A ledger failure is captured, not
    /// propagated, so one worker's bad data cannot abort the pool.
    pub fn fetch(ledger: &dyn AssignmentLedger, worker_id: &str) -> Self {
        match ledger.assignment_history(worker_id) {
            Ok(history) => Self::Loaded(LedgerView::new(history)),
            Err(e) => {
                log::warn!("ledger read failed for worker {worker_id}: {e}");
                Self::Unavailable { reason: e.to_string() }
            }
        }
    }

    pub fn view(&self) -> Result<&LedgerView, &str> {
        match self {
            Self::Loaded(view) => Ok(view),
            Self::Unavailable { reason } => Err(reason.as_str()),
        }
    }

    /// Current workload, if it can be computed.
    pub fn workload(&self) -> Result<WorkloadSnapshot, String> {
        self.view().map_err(str::to_string)?.workload()
    }
}

impl From<Vec<AssignmentSummary>> for LedgerState {
    fn from(history: Vec<AssignmentSummary>) -> Self {
        Self::Loaded(LedgerView::new(history))
    }
}
