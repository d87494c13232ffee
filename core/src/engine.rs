//! The matching engine: composite scoring, ranking and selection.
//!
//! PIPELINE (per call, nothing carried between calls):
//!   1. Pool snapshot      — WorkerDirectory::list_available_workers
//!   2. Ledger view        — one history read per worker
//!   3. Candidate build    — skills normalised, ledger state attached
//!   4. Factor scoring     — scoring.rs, never fails
//!   5. Composite          — fixed weights, floored at 0
//!   6. Ranking            — drop scores <= 0, stable sort descending
//!
//! RULES:
//!   - The engine never writes. Assignment creation is the orchestrator's job.
//!   - Ties keep pool order: the first-seen worker wins.
//!   - Empty pool and "nobody scored > 0" are outcomes, not errors.
//!   - Concurrent calls share only the immutable config. Two calls may
//!     pick the same worker; callers that need exclusivity must serialise
//!     "read workload → choose → commit" themselves.

use crate::{
    config::MatchConfig,
    error::MatchResult,
    ledger::{AssignmentLedger, WorkerDirectory},
    scoring::{self, Factor, FactorScore},
    task::TaskRequirement,
    worker::{Worker, WorkerCandidate},
    workload::LedgerState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ── Results ──────────────────────────────────────────────────────────────────

/// Every factor behind one worker's composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub domain_expertise: FactorScore,
    /// `None` when the requirement lists no skills; the factor then
    /// contributes nothing.
    pub skills_match: Option<FactorScore>,
    pub workload_balance: FactorScore,
    pub priority_handling: FactorScore,
    pub task_type_experience: FactorScore,
    pub department_alignment: FactorScore,
    /// Urgency of the task type. Only folded into `composite` when the
    /// config enables it.
    pub urgency: f64,
    pub composite: f64,
}

impl ScoreBreakdown {
    pub fn factors(&self) -> Vec<(Factor, &FactorScore)> {
        let mut out = vec![(Factor::DomainExpertise, &self.domain_expertise)];
        if let Some(skills) = &self.skills_match {
            out.push((Factor::SkillsMatch, skills));
        }
        out.extend([
            (Factor::WorkloadBalance, &self.workload_balance),
            (Factor::PriorityHandling, &self.priority_handling),
            (Factor::TaskTypeExperience, &self.task_type_experience),
            (Factor::DepartmentAlignment, &self.department_alignment),
        ]);
        out
    }

    pub fn degraded_factors(&self) -> Vec<Factor> {
        self.factors()
            .into_iter()
            .filter(|(_, s)| s.is_degraded())
            .map(|(f, _)| f)
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.factors().iter().any(|(_, s)| s.is_degraded())
    }
}

/// A worker with a positive composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub worker: Worker,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoMatchReason {
    /// No available workers at all.
    EmptyPool,
    /// Workers were scored but none scored above 0.
    NoQualifiedCandidate { evaluated: usize },
}

impl std::fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPool => f.write_str("no available workers"),
            Self::NoQualifiedCandidate { evaluated } => {
                write!(f, "none of {evaluated} workers scored above 0")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched(ScoredCandidate),
    NoMatch(NoMatchReason),
}

impl MatchOutcome {
    pub fn best(&self) -> Option<&ScoredCandidate> {
        match self {
            Self::Matched(c) => Some(c),
            Self::NoMatch(_) => None,
        }
    }

    pub fn into_best(self) -> Option<ScoredCandidate> {
        match self {
            Self::Matched(c) => Some(c),
            Self::NoMatch(_) => None,
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: Arc<MatchConfig>,
}

impl MatchEngine {
    pub fn new(config: Arc<MatchConfig>) -> Self {
        Self { config }
    }

    /// Engine over the built-in taxonomy and weights.
    pub fn builtin() -> Self {
        Self::new(Arc::new(MatchConfig::builtin()))
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Score one candidate against one requirement.
    pub fn score(&self, req: &TaskRequirement, candidate: &WorkerCandidate) -> ScoreBreakdown {
        let cfg = &*self.config;
        let w = &cfg.weights;

        let domain_expertise =
            scoring::domain_expertise(&cfg.taxonomy, &candidate.skills, &req.domain, w.neutral);
        let skills_match = req
            .skill_requirements()
            .map(|required| scoring::skills_match(&candidate.skills, &required));
        let workload_balance = scoring::workload_balance(w, &candidate.ledger);
        let priority_handling = scoring::priority_handling(w, req.priority, &candidate.ledger);
        let task_type_experience =
            scoring::task_type_experience(w, &req.task_type, &candidate.ledger);
        let department_alignment = scoring::department_alignment(
            &cfg.taxonomy,
            candidate.worker.department.as_deref(),
            &req.domain,
        );

        let mut composite = w.availability_base
            + w.domain_expertise * domain_expertise.value()
            + skills_match
                .as_ref()
                .map(|s| w.skills_match * s.value())
                .unwrap_or(0.0)
            + w.workload_balance * workload_balance.value()
            + w.priority_handling * priority_handling.value()
            + w.task_type_experience * task_type_experience.value()
            + w.department_alignment * department_alignment.value();

        let urgency = cfg.urgency_for(req.task_type.canonical());
        if cfg.apply_urgency_multiplier {
            composite *= urgency;
        }
        if !composite.is_finite() {
            composite = 0.0;
        }

        ScoreBreakdown {
            domain_expertise,
            skills_match,
            workload_balance,
            priority_handling,
            task_type_experience,
            department_alignment,
            urgency,
            composite: composite.max(0.0),
        }
    }

    /// Fetch the available pool and pair each worker with a fresh ledger view.
    pub fn build_candidates(
        &self,
        directory: &dyn WorkerDirectory,
        ledger: &dyn AssignmentLedger,
    ) -> MatchResult<Vec<WorkerCandidate>> {
        let workers = directory.list_available_workers()?;
        Ok(workers
            .into_iter()
            .filter(|w| w.available)
            .map(|worker| {
                let state = LedgerState::fetch(ledger, &worker.worker_id);
                WorkerCandidate::new(worker, state)
            })
            .collect())
    }

    /// Score, filter and order candidates. Only available workers with a
    /// composite above 0 survive. Order is score descending; equal scores
    /// keep their input order.
    pub fn rank(&self, req: &TaskRequirement, candidates: &[WorkerCandidate]) -> Vec<ScoredCandidate> {
        if !req.task_type.is_recognized() {
            log::debug!("unrecognised task type '{}', weighting as task", req.task_type);
        }
        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .filter(|c| c.worker.available)
            .filter_map(|c| {
                let breakdown = self.score(req, c);
                log::debug!(
                    "worker {} scored {:.2} for {} in {} (domain {:.2}, workload {:.2})",
                    c.worker_id(),
                    breakdown.composite,
                    req.task_type,
                    req.domain,
                    breakdown.domain_expertise.value(),
                    breakdown.workload_balance.value(),
                );
                for (factor, score) in breakdown.factors() {
                    if let Some(reason) = score.degradation_reason() {
                        log::warn!(
                            "worker {}: {} degraded to {:.2}: {reason}",
                            c.worker_id(),
                            factor.name(),
                            score.value()
                        );
                    }
                }
                (breakdown.composite > 0.0).then(|| ScoredCandidate {
                    worker: c.worker.clone(),
                    score: breakdown.composite,
                    breakdown,
                })
            })
            .collect();

        // sort_by is stable: ties keep pool order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Pick the single best candidate from an already-built pool.
    pub fn select(&self, req: &TaskRequirement, candidates: &[WorkerCandidate]) -> MatchOutcome {
        if candidates.iter().all(|c| !c.worker.available) {
            log::warn!("No available workers for {} in {}", req.task_type, req.domain);
            return MatchOutcome::NoMatch(NoMatchReason::EmptyPool);
        }

        match self.rank(req, candidates).into_iter().next() {
            Some(best) => {
                log::info!(
                    "Selected worker {} (score: {:.2}) for {} in {}",
                    best.worker.name,
                    best.score,
                    req.task_type,
                    req.domain
                );
                MatchOutcome::Matched(best)
            }
            None => {
                log::warn!("No qualified workers found for {} in {}", req.task_type, req.domain);
                MatchOutcome::NoMatch(NoMatchReason::NoQualifiedCandidate {
                    evaluated: candidates.len(),
                })
            }
        }
    }

    /// Best single worker for `req`, or the reason there is none.
    pub fn find_best(
        &self,
        req: &TaskRequirement,
        directory: &dyn WorkerDirectory,
        ledger: &dyn AssignmentLedger,
    ) -> MatchResult<MatchOutcome> {
        let candidates = self.build_candidates(directory, ledger)?;
        Ok(self.select(req, &candidates))
    }

    /// Up to `limit` candidates (config default when `None`), best first.
    pub fn recommend(
        &self,
        req: &TaskRequirement,
        directory: &dyn WorkerDirectory,
        ledger: &dyn AssignmentLedger,
        limit: Option<usize>,
    ) -> MatchResult<Vec<ScoredCandidate>> {
        let limit = limit.unwrap_or(self.config.default_recommend_limit);
        let candidates = self.build_candidates(directory, ledger)?;
        let mut ranked = self.rank(req, &candidates);
        ranked.truncate(limit);
        Ok(ranked)
    }
}
