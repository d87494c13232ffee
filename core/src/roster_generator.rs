//! Deterministic demo roster generation.
//!
//! RULE: Nothing here may call a platform RNG. Every roster is derived
//! from a single seed, so the same seed always yields the same workers,
//! tasks and history. Used by the runner and by the property tests.

use crate::{
    assignment::{AssignmentRecord, AssignmentStatus, SelectionPath},
    config::DomainTaxonomy,
    task::{Priority, TaskRecord, TaskStatus},
    worker::Worker,
};
use chrono::{TimeZone, Utc};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Seeded RNG for roster generation.
pub struct RosterRng {
    inner: Pcg64Mcg,
}

impl RosterRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }
}

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Eva", "Frank", "Grace", "Henry", "Irene", "Jamal",
    "Keiko", "Luis", "Maya", "Nikolai", "Olivia", "Priya", "Quentin", "Rosa", "Samir", "Tessa",
];

const LAST_NAMES: &[&str] = &[
    "Johnson", "Smith", "Davis", "Wilson", "Brown", "Miller", "Nguyen", "Garcia", "Okafor",
    "Kowalski", "Tanaka", "Haddad", "Larsen", "Moreau", "Patel", "Rossi",
];

const DEPARTMENT_SUFFIXES: &[&str] = &["Engineering", "Team", "Development", "Group"];

const SOURCES: &[&str] = &["jira-bug", "jira-story", "slack-incident", "jira-feature", "manual-task"];

/// Builds synthetic workers, tasks and assignment history.
pub struct RosterGenerator<'a> {
    taxonomy: &'a DomainTaxonomy,
    rng: RosterRng,
}

impl<'a> RosterGenerator<'a> {
    pub fn new(taxonomy: &'a DomainTaxonomy, seed: u64) -> Self {
        Self {
            taxonomy,
            rng: RosterRng::new(seed),
        }
    }

    pub fn full_name(&mut self) -> String {
        let first = *self.rng.pick(FIRST_NAMES);
        let last = *self.rng.pick(LAST_NAMES);
        format!("{first} {last}")
    }

    /// One worker with skills drawn from a home domain, sometimes with a
    /// stray skill from another domain, and a matching-ish department.
    pub fn worker(&mut self, index: usize) -> Worker {
        let name = self.full_name();
        let worker_id = format!("w-{index:04}");
        let domains: Vec<&str> = self.taxonomy.domains().collect();
        if domains.is_empty() {
            return Worker::new(worker_id, name);
        }

        let home = *self.rng.pick(&domains);
        let mut skills: Vec<String> = Vec::new();
        for k in self.taxonomy.keywords_for(home).unwrap_or(&[]) {
            if self.rng.chance(0.5) {
                skills.push(k.clone());
            }
        }
        if self.rng.chance(0.3) {
            let other = *self.rng.pick(&domains);
            if let Some(keywords) = self.taxonomy.keywords_for(other).filter(|k| !k.is_empty()) {
                let stray = self.rng.pick(keywords).clone();
                if !skills.contains(&stray) {
                    skills.push(stray);
                }
            }
        }

        let department = if self.rng.chance(0.1) {
            None
        } else {
            let mut head = home.to_string();
            if let Some(first) = head.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            Some(format!("{head} {}", self.rng.pick(DEPARTMENT_SUFFIXES)))
        };

        // Some rosters store skills as JSON lists.
        let raw_skills = if self.rng.chance(0.2) {
            serde_json::to_string(&skills).unwrap_or_default()
        } else {
            skills.join(",")
        };

        Worker {
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            worker_id,
            name,
            department,
            raw_skills,
            available: self.rng.chance(0.9),
        }
    }

    pub fn workers(&mut self, count: usize) -> Vec<Worker> {
        (0..count).map(|i| self.worker(i)).collect()
    }

    /// A historical task with a random source tag and priority.
    pub fn task(&mut self, task_id: impl Into<String>) -> TaskRecord {
        let priority = *self.rng.pick(&[Priority::Low, Priority::Medium, Priority::High]);
        let source = *self.rng.pick(SOURCES);
        let hours = (1 + self.rng.next_u64_below(16)) as f64;
        let task_id = task_id.into();
        TaskRecord::new(task_id.clone(), format!("Historical work item {task_id}"), priority)
            .with_source(source)
            .with_estimated_hours(hours)
    }

    /// A past or ongoing assignment of `task` to `worker`.
    pub fn history_entry(&mut self, worker: &Worker, task: &TaskRecord, seq: usize) -> AssignmentRecord {
        let status = *self.rng.pick(&[
            AssignmentStatus::Assigned,
            AssignmentStatus::Accepted,
            AssignmentStatus::Completed,
            AssignmentStatus::Completed,
            AssignmentStatus::Declined,
        ]);
        let path = SelectionPath::fallback("seed");
        AssignmentRecord {
            assignment_id: format!("hist-{seq:05}"),
            task_id: task.task_id.clone(),
            worker_id: worker.worker_id.clone(),
            assigned_by: path.assigned_by(),
            path,
            status,
            notes: String::new(),
            created_at: Utc
                .timestamp_opt(1_700_000_000 + seq as i64 * 3_600, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Up to `max_per_worker` past assignments for each worker. Task
    /// status follows the assignment: open work keeps the task assigned,
    /// completed work closes it, declined work releases it.
    pub fn history(
        &mut self,
        workers: &[Worker],
        max_per_worker: u64,
    ) -> Vec<(TaskRecord, AssignmentRecord)> {
        let mut out = Vec::new();
        for worker in workers {
            let n = self.rng.next_u64_below(max_per_worker + 1);
            for _ in 0..n {
                let seq = out.len();
                let mut task = self.task(format!("hist-task-{seq:05}"));
                let entry = self.history_entry(worker, &task, seq);
                task.status = match entry.status {
                    AssignmentStatus::Assigned | AssignmentStatus::Accepted => TaskStatus::Assigned,
                    AssignmentStatus::Completed => TaskStatus::Closed,
                    AssignmentStatus::Declined | AssignmentStatus::Cancelled => {
                        TaskStatus::Unassigned
                    }
                };
                out.push((task, entry));
            }
        }
        out
    }
}
