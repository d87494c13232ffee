//! Factor scorers.
//!
//! Each factor maps one aspect of worker/task fit into [0, 1]. Factors
//! never fail: when their input is unusable they return
//! [`FactorScore::Degraded`] carrying the factor's fallback value (0 for
//! matching factors, the neutral 0.5 for ambiguous ones) and the reason.

use crate::{
    config::{DomainTaxonomy, ScoringWeights},
    skills::SkillSet,
    task::{Priority, TaskType},
    workload::{LedgerState, WorkloadSnapshot},
};
use serde::{Deserialize, Serialize};

// ── Factor result ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FactorScore {
    Computed { value: f64 },
    Degraded { value: f64, reason: String },
}

impl FactorScore {
    /// A computed value, clamped into [0, 1]. Non-finite input degrades to 0.
    pub fn computed(value: f64) -> Self {
        if !value.is_finite() {
            return Self::degraded(0.0, format!("non-finite factor value {value}"));
        }
        Self::Computed { value: value.clamp(0.0, 1.0) }
    }

    pub fn degraded(value: f64, reason: impl Into<String>) -> Self {
        Self::Degraded { value, reason: reason.into() }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Computed { value } | Self::Degraded { value, .. } => *value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            Self::Degraded { reason, .. } => Some(reason.as_str()),
            Self::Computed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    DomainExpertise,
    SkillsMatch,
    WorkloadBalance,
    PriorityHandling,
    TaskTypeExperience,
    DepartmentAlignment,
}

impl Factor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DomainExpertise => "domain_expertise",
            Self::SkillsMatch => "skills_match",
            Self::WorkloadBalance => "workload_balance",
            Self::PriorityHandling => "priority_handling",
            Self::TaskTypeExperience => "task_type_experience",
            Self::DepartmentAlignment => "department_alignment",
        }
    }
}

// ── Domain expertise ─────────────────────────────────────────────────────────

/// Fraction of the domain's keywords found (as substrings) in the
/// worker's skills. Unknown domains score `neutral`, never 0, so an
/// unmapped domain does not disqualify anyone.
pub fn domain_expertise(
    taxonomy: &DomainTaxonomy,
    skills: &SkillSet,
    domain: &str,
    neutral: f64,
) -> FactorScore {
    let keywords = match taxonomy.keywords_for(domain) {
        Some(k) if !k.is_empty() => k,
        _ => return FactorScore::Computed { value: neutral },
    };

    // One hit per keyword, however many skills contain it.
    let matched = keywords.iter().filter(|k| skills.any_contains(k)).count();
    FactorScore::computed(matched as f64 / keywords.len() as f64)
}

// ── Skills match ─────────────────────────────────────────────────────────────

/// Fraction of required skills present (as substrings) in the worker's
/// skills. 0 when either side is empty.
pub fn skills_match(skills: &SkillSet, required: &[String]) -> FactorScore {
    if required.is_empty() || skills.is_empty() {
        return FactorScore::Computed { value: 0.0 };
    }
    let matched = required.iter().filter(|r| skills.any_contains(r)).count();
    FactorScore::computed(matched as f64 / required.len() as f64)
}

// ── Workload balance ─────────────────────────────────────────────────────────

/// Blend of task-count and hours headroom. Each part saturates at 0 once
/// its fixed limit is reached, so the result stays in [0, 1] and never
/// increases as load grows.
pub fn workload_balance_value(weights: &ScoringWeights, workload: &WorkloadSnapshot) -> f64 {
    let task_count_score =
        (1.0 - workload.active_task_count as f64 / weights.task_count_saturation).max(0.0);
    let hours_score =
        (1.0 - workload.active_estimated_hours / weights.hours_saturation).max(0.0);
    weights.task_count_share * task_count_score + weights.hours_share * hours_score
}

pub fn workload_balance(weights: &ScoringWeights, ledger: &LedgerState) -> FactorScore {
    match ledger.workload() {
        Ok(workload) => FactorScore::computed(workload_balance_value(weights, &workload)),
        Err(reason) => FactorScore::degraded(weights.neutral, reason),
    }
}

// ── Priority handling ────────────────────────────────────────────────────────

/// Headroom for another high-priority task. Only meaningful when the
/// requirement itself is high priority; otherwise `neutral`.
pub fn priority_handling(
    weights: &ScoringWeights,
    priority: Priority,
    ledger: &LedgerState,
) -> FactorScore {
    if priority != Priority::High {
        return FactorScore::Computed { value: weights.neutral };
    }
    match ledger.view() {
        Ok(view) => {
            let high = view.active_high_priority_count() as f64;
            FactorScore::computed((1.0 - high / weights.high_priority_saturation).max(0.0))
        }
        Err(reason) => FactorScore::degraded(weights.neutral, reason),
    }
}

// ── Task-type experience ─────────────────────────────────────────────────────

/// Prior assignments of the same type, saturating at
/// `experience_saturation` occurrences.
pub fn task_type_experience(
    weights: &ScoringWeights,
    task_type: &TaskType,
    ledger: &LedgerState,
) -> FactorScore {
    match ledger.view() {
        Ok(view) => {
            let count = view.type_experience_count(task_type.as_str()) as f64;
            FactorScore::computed((count / weights.experience_saturation).min(1.0))
        }
        Err(reason) => FactorScore::degraded(0.0, reason),
    }
}

// ── Department alignment ─────────────────────────────────────────────────────

/// 1.0 when the worker's department contains any department substring
/// aligned with the domain, else 0.0.
pub fn department_alignment(
    taxonomy: &DomainTaxonomy,
    department: Option<&str>,
    domain: &str,
) -> FactorScore {
    let department = match department.map(|d| d.trim().to_lowercase()) {
        Some(d) if !d.is_empty() => d,
        _ => return FactorScore::Computed { value: 0.0 },
    };
    let aligned = taxonomy
        .departments_for(domain)
        .map(|expected| expected.iter().any(|e| department.contains(e.as_str())))
        .unwrap_or(false);
    FactorScore::Computed { value: if aligned { 1.0 } else { 0.0 } }
}
