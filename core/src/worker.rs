//! Workers and the per-call candidate view built from them.
//!
//! A [`Worker`] is a read-only roster entry. Workload is never stored on
//! it: each matching call pairs the worker with a freshly computed
//! [`LedgerState`] inside a [`WorkerCandidate`].

use crate::{
    skills::SkillSet,
    types::WorkerId,
    workload::LedgerState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub worker_id: WorkerId,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    /// Skill listing as stored: delimited text or serialised JSON.
    pub raw_skills: String,
    pub available: bool,
}

impl Worker {
    pub fn new(worker_id: impl Into<WorkerId>, name: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            name: name.into(),
            email: String::new(),
            department: None,
            raw_skills: String::new(),
            available: true,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_skills(mut self, raw_skills: impl Into<String>) -> Self {
        self.raw_skills = raw_skills.into();
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

/// A worker combined with its normalised skills and ledger state for
/// one matching call.
#[derive(Debug, Clone)]
pub struct WorkerCandidate {
    pub worker: Worker,
    pub skills: SkillSet,
    pub ledger: LedgerState,
}

impl WorkerCandidate {
    pub fn new(worker: Worker, ledger: LedgerState) -> Self {
        let skills = SkillSet::parse(&worker.raw_skills);
        Self { worker, skills, ledger }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker.worker_id
    }
}
