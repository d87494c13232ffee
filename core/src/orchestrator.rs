//! Assignment orchestration.
//!
//! Turns a selected worker into an assignment record plus a notification
//! payload and hands both to an [`AssignmentSink`]. The only task state
//! change owned here is `unassigned → assigned`; acceptance, decline and
//! completion belong to the external workflow.
//!
//! When the engine finds nobody, the orchestrator reports
//! [`AssignmentOutcome::Unassigned`] and stops. Whether to try a
//! secondary decision path is the caller's call; that path commits its
//! pick through [`Orchestrator::assign_to`] with [`SelectionPath::Fallback`].

use crate::{
    assignment::{AssignmentRecord, AssignmentStatus, NotificationPayload, SelectionPath},
    engine::{MatchEngine, MatchOutcome, NoMatchReason},
    error::{MatchError, MatchResult},
    event::MatchEvent,
    ledger::{AssignmentLedger, AssignmentSink, WorkerDirectory},
    task::{TaskRecord, TaskRequirement, TaskStatus},
    worker::Worker,
};
use chrono::Utc;

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOutcome {
    Assigned {
        record: AssignmentRecord,
        notification: NotificationPayload,
        /// Composite score of the chosen worker on the direct-match path.
        score: Option<f64>,
    },
    Unassigned(NoMatchReason),
}

impl AssignmentOutcome {
    pub fn record(&self) -> Option<&AssignmentRecord> {
        match self {
            Self::Assigned { record, .. } => Some(record),
            Self::Unassigned(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    engine: MatchEngine,
}

impl Orchestrator {
    pub fn new(engine: MatchEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Build the record and notification for `worker` taking `task`.
    /// Pure: nothing is persisted or sent.
    pub fn prepare(
        &self,
        worker: &Worker,
        task: &TaskRecord,
        req: &TaskRequirement,
        path: SelectionPath,
    ) -> MatchResult<(AssignmentRecord, NotificationPayload)> {
        if task.status != TaskStatus::Unassigned {
            return Err(MatchError::InvalidTransition {
                entity: "task",
                from: task.status.as_str().into(),
                to: TaskStatus::Assigned.as_str().into(),
            });
        }

        let how = match &path {
            SelectionPath::DirectMatch => "Assigned by intelligent matching system.".to_string(),
            SelectionPath::Fallback { strategy } => {
                format!("Assigned by fallback decision path ({strategy}).")
            }
        };
        let record = AssignmentRecord {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            task_id: task.task_id.clone(),
            worker_id: worker.worker_id.clone(),
            assigned_by: path.assigned_by(),
            path,
            status: AssignmentStatus::Assigned,
            notes: format!("{how} Task type: {}, Domain: {}", req.task_type, req.domain),
            created_at: Utc::now(),
        };
        let notification =
            NotificationPayload::task_assigned(&worker.email, &task.title, &task.description);
        Ok((record, notification))
    }

    /// Match `task` against the current pool and commit the best pick.
    pub fn assign(
        &self,
        task: &TaskRecord,
        req: &TaskRequirement,
        directory: &dyn WorkerDirectory,
        ledger: &dyn AssignmentLedger,
        sink: &dyn AssignmentSink,
    ) -> MatchResult<AssignmentOutcome> {
        let best = match self.engine.find_best(req, directory, ledger)? {
            MatchOutcome::Matched(best) => best,
            MatchOutcome::NoMatch(reason) => {
                log::warn!("No suitable worker for task '{}': {reason}", task.title);
                sink.record_event(&MatchEvent::NoMatch {
                    task_id: task.task_id.clone(),
                    reason: reason.to_string(),
                })?;
                return Ok(AssignmentOutcome::Unassigned(reason));
            }
        };

        let (record, notification) =
            self.prepare(&best.worker, task, req, SelectionPath::DirectMatch)?;

        let selected = MatchEvent::MatchSelected {
            task_id: task.task_id.clone(),
            worker_id: best.worker.worker_id.clone(),
            score: best.score,
            degraded_factors: best
                .breakdown
                .degraded_factors()
                .iter()
                .map(|f| f.name().to_string())
                .collect(),
        };
        self.commit(sink, &record, &notification, &best.worker, Some(selected))?;

        Ok(AssignmentOutcome::Assigned { record, notification, score: Some(best.score) })
    }

    /// Commit a worker chosen outside the engine (manual pick, secondary
    /// decision process).
    pub fn assign_to(
        &self,
        worker: &Worker,
        task: &TaskRecord,
        req: &TaskRequirement,
        path: SelectionPath,
        sink: &dyn AssignmentSink,
    ) -> MatchResult<AssignmentOutcome> {
        let (record, notification) = self.prepare(worker, task, req, path)?;
        self.commit(sink, &record, &notification, worker, None)?;
        Ok(AssignmentOutcome::Assigned { record, notification, score: None })
    }

    fn commit(
        &self,
        sink: &dyn AssignmentSink,
        record: &AssignmentRecord,
        notification: &NotificationPayload,
        worker: &Worker,
        selected: Option<MatchEvent>,
    ) -> MatchResult<()> {
        sink.commit(record, notification)?;
        log::info!(
            "Task {} assigned to {} via {}",
            record.task_id,
            worker.name,
            record.assigned_by
        );

        // Committed from here on: audit failures are only logged.
        if let Some(event) = selected {
            if let Err(e) = sink.record_event(&event) {
                log::warn!("could not log match for task {}: {e}", record.task_id);
            }
        }
        let created = MatchEvent::AssignmentCreated {
            task_id: record.task_id.clone(),
            worker_id: record.worker_id.clone(),
            assignment_id: record.assignment_id.clone(),
            assigned_by: record.assigned_by.clone(),
        };
        if let Err(e) = sink.record_event(&created) {
            log::warn!("could not log assignment {}: {e}", record.assignment_id);
        }
        Ok(())
    }
}
