//! External collaborator seams.
//!
//! RULE: The engine reads worker and assignment state only through
//! these traits and never writes through them. All mutations go through
//! [`AssignmentSink`], which only the orchestrator calls.

use crate::{
    assignment::{AssignmentRecord, AssignmentSummary, NotificationPayload},
    error::MatchResult,
    event::MatchEvent,
    worker::Worker,
};

/// Source of the availability-filtered worker pool.
pub trait WorkerDirectory {
    /// Available workers in a stable order. The order is the tie-break
    /// order used by the ranker.
    fn list_available_workers(&self) -> MatchResult<Vec<Worker>>;
}

/// Read access to the assignment ledger.
pub trait AssignmentLedger {
    /// Every assignment ever made to `worker_id`, any status.
    fn assignment_history(&self, worker_id: &str) -> MatchResult<Vec<AssignmentSummary>>;

    /// Assignments currently `assigned` or `accepted`.
    fn active_assignments(&self, worker_id: &str) -> MatchResult<Vec<AssignmentSummary>> {
        Ok(self
            .assignment_history(worker_id)?
            .into_iter()
            .filter(|a| a.status.is_active())
            .collect())
    }
}

/// Persistence and notification hand-off for finished decisions.
pub trait AssignmentSink {
    /// Persist `record`, move its task to `assigned`, and queue
    /// `notification`. Either all of it happens or none of it does.
    fn commit(&self, record: &AssignmentRecord, notification: &NotificationPayload) -> MatchResult<()>;

    /// Append a decision to the audit log.
    fn record_event(&self, event: &MatchEvent) -> MatchResult<()>;
}
