//! Matching engine tests: composite scoring, ranking, selection and
//! per-worker degradation, run against in-memory collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use taskmatch_core::{
    assignment::{AssignmentStatus, AssignmentSummary},
    config::MatchConfig,
    engine::{MatchEngine, MatchOutcome, NoMatchReason},
    error::{MatchError, MatchResult},
    ledger::{AssignmentLedger, WorkerDirectory},
    roster_generator::{RosterGenerator, RosterRng},
    scoring::Factor,
    task::{Priority, TaskRequirement, TaskType},
    worker::Worker,
};

/// Pool and ledger held in memory. Workers listed in `broken` fail
/// their ledger read.
#[derive(Default)]
struct FakeRoster {
    workers: Vec<Worker>,
    history: HashMap<String, Vec<AssignmentSummary>>,
    broken: Vec<String>,
}

impl FakeRoster {
    fn with(workers: Vec<Worker>) -> Self {
        Self { workers, ..Self::default() }
    }

    fn load(mut self, worker_id: &str, summaries: Vec<AssignmentSummary>) -> Self {
        self.history.insert(worker_id.into(), summaries);
        self
    }

    fn break_ledger(mut self, worker_id: &str) -> Self {
        self.broken.push(worker_id.into());
        self
    }
}

impl WorkerDirectory for FakeRoster {
    fn list_available_workers(&self) -> MatchResult<Vec<Worker>> {
        Ok(self.workers.iter().filter(|w| w.available).cloned().collect())
    }
}

impl AssignmentLedger for FakeRoster {
    fn assignment_history(&self, worker_id: &str) -> MatchResult<Vec<AssignmentSummary>> {
        if self.broken.iter().any(|b| b == worker_id) {
            return Err(MatchError::Ledger {
                worker_id: worker_id.into(),
                reason: "connection reset".into(),
            });
        }
        Ok(self.history.get(worker_id).cloned().unwrap_or_default())
    }
}

struct DownDirectory;

impl WorkerDirectory for DownDirectory {
    fn list_available_workers(&self) -> MatchResult<Vec<Worker>> {
        Err(MatchError::Other(anyhow::anyhow!("directory unreachable")))
    }
}

fn busy(task_id: &str, priority: Priority, hours: f64) -> AssignmentSummary {
    AssignmentSummary {
        task_id: task_id.into(),
        task_estimated_hours: Some(hours),
        task_priority: priority,
        task_source: "jira-story".into(),
        status: AssignmentStatus::Assigned,
    }
}

fn frontend_dev(id: &str) -> Worker {
    Worker::new(id, format!("Frontend {id}"))
        .with_email(format!("{id}@example.com"))
        .with_department("Frontend")
        .with_skills("javascript,react,css")
}

fn backend_dev(id: &str) -> Worker {
    Worker::new(id, format!("Backend {id}"))
        .with_email(format!("{id}@example.com"))
        .with_department("Backend")
        .with_skills("python,sql")
}

fn frontend_bug() -> TaskRequirement {
    TaskRequirement::new(TaskType::Bug, Priority::Medium, "frontend")
}

// ── Scenarios ────────────────────────────────────────────────────────────────

/// Domain, workload and department all favour the idle frontend worker.
#[test]
fn idle_specialist_beats_loaded_generalist() {
    let roster = FakeRoster::with(vec![backend_dev("b"), frontend_dev("a")]).load(
        "b",
        vec![
            busy("t1", Priority::Medium, 10.0),
            busy("t2", Priority::Medium, 10.0),
            busy("t3", Priority::Medium, 10.0),
        ],
    );
    let engine = MatchEngine::builtin();

    let ranked = engine.recommend(&frontend_bug(), &roster, &roster, None).unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].worker.worker_id, "a");

    // 10 + 20*(3/8) + 10*1 + 8*0.5 + 5*0 + 3*1
    assert!((ranked[0].score - 34.5).abs() < 1e-9, "a scored {}", ranked[0].score);
    // 10 + 0 + 10*(0.6*0.4 + 0.4*0.25) + 4 + 0 + 0
    assert!((ranked[1].score - 17.4).abs() < 1e-9, "b scored {}", ranked[1].score);
}

/// A missed required skill lowers the score but keeps domain credit.
#[test]
fn missing_required_skill_reduces_but_keeps_candidate() {
    let worker = Worker::new("f", "Fran").with_skills("javascript, react, css, html");
    let roster = FakeRoster::with(vec![worker]);
    let engine = MatchEngine::builtin();

    let plain = engine.recommend(&frontend_bug(), &roster, &roster, None).unwrap();
    let wants_python = frontend_bug().with_skills(["python"]);
    let ranked = engine.recommend(&wants_python, &roster, &roster, None).unwrap();

    let best = &ranked[0];
    assert_eq!(best.breakdown.skills_match.as_ref().map(|s| s.value()), Some(0.0));
    assert!((best.breakdown.domain_expertise.value() - 0.5).abs() < 1e-9);
    assert!(best.score > 0.0);
    assert!(best.score <= plain[0].score);
}

#[test]
fn skills_factor_absent_without_requirements() {
    let roster = FakeRoster::with(vec![frontend_dev("a")]);
    let engine = MatchEngine::builtin();
    for req in [frontend_bug(), frontend_bug().with_skills(["  ", ""])] {
        let best = engine.find_best(&req, &roster, &roster).unwrap().into_best().unwrap();
        assert!(best.breakdown.skills_match.is_none());
    }

    let req = frontend_bug().with_skills(["React", "css"]);
    let best = engine.find_best(&req, &roster, &roster).unwrap().into_best().unwrap();
    assert_eq!(best.breakdown.skills_match.map(|s| s.value()), Some(1.0));
}

// ── Ties and ordering ────────────────────────────────────────────────────────

/// Equal scores keep pool order, whichever worker comes first.
#[test]
fn ties_go_to_first_in_pool() {
    let engine = MatchEngine::builtin();
    let req = frontend_bug();

    let forward = FakeRoster::with(vec![frontend_dev("x"), frontend_dev("y")]);
    let best = engine.find_best(&req, &forward, &forward).unwrap().into_best().unwrap();
    assert_eq!(best.worker.worker_id, "x");

    let backward = FakeRoster::with(vec![frontend_dev("y"), frontend_dev("x")]);
    let best = engine.find_best(&req, &backward, &backward).unwrap().into_best().unwrap();
    assert_eq!(best.worker.worker_id, "y");

    let ranked = engine.recommend(&req, &backward, &backward, None).unwrap();
    let ids: Vec<&str> = ranked.iter().map(|c| c.worker.worker_id.as_str()).collect();
    assert_eq!(ids, ["y", "x"]);
}

/// Sweep seeded rosters and requirements: recommend is sorted, bounded
/// by the limit, positive, and its head agrees with find_best.
#[test]
fn recommend_is_sorted_bounded_and_positive() {
    let config = MatchConfig::builtin();
    let engine = MatchEngine::builtin();
    let domains: Vec<String> = config
        .taxonomy
        .domains()
        .map(str::to_string)
        .chain(["astrology".to_string()])
        .collect();
    let types = ["bug", "incident", "feature", "story", "task", "epic"];
    let priorities = [Priority::Low, Priority::Medium, Priority::High];

    for seed in 0..20u64 {
        let mut gen = RosterGenerator::new(&config.taxonomy, seed);
        let workers = gen.workers(15);
        let mut roster = FakeRoster::with(workers.clone());
        for (task, entry) in gen.history(&workers, 6) {
            roster.history.entry(entry.worker_id.clone()).or_default().push(AssignmentSummary {
                task_id: task.task_id,
                task_estimated_hours: task.estimated_hours,
                task_priority: task.priority,
                task_source: task.source,
                status: entry.status,
            });
        }

        let mut rng = RosterRng::new(seed ^ 0xFEED);
        for _ in 0..10 {
            let req = TaskRequirement::new(
                TaskType::parse(*rng.pick(&types)),
                *rng.pick(&priorities),
                rng.pick(&domains).clone(),
            );
            let limit = rng.next_u64_below(8) as usize;

            let ranked = engine.recommend(&req, &roster, &roster, Some(limit)).unwrap();
            assert!(ranked.len() <= limit);
            assert!(ranked.iter().all(|c| c.score > 0.0));
            assert!(ranked.iter().all(|c| c.worker.available));
            assert!(ranked.windows(2).all(|p| p[0].score >= p[1].score));

            let best = engine.find_best(&req, &roster, &roster).unwrap();
            let top = engine.recommend(&req, &roster, &roster, Some(1)).unwrap();
            assert_eq!(best.best().map(|b| &b.worker.worker_id), top.first().map(|b| &b.worker.worker_id));
        }
    }
}

#[test]
fn recommend_defaults_to_five() {
    let workers = (0..8).map(|i| frontend_dev(&format!("w{i}"))).collect();
    let roster = FakeRoster::with(workers);
    let ranked = MatchEngine::builtin()
        .recommend(&frontend_bug(), &roster, &roster, None)
        .unwrap();
    assert_eq!(ranked.len(), 5);
}

/// Same pool, same ledger: same answer.
#[test]
fn find_best_is_idempotent() {
    let roster = FakeRoster::with(vec![backend_dev("b"), frontend_dev("a"), frontend_dev("c")])
        .load("a", vec![busy("t1", Priority::High, 6.0)]);
    let engine = MatchEngine::builtin();
    let req = TaskRequirement::new(TaskType::Incident, Priority::High, "frontend");

    let first = engine.find_best(&req, &roster, &roster).unwrap();
    let second = engine.find_best(&req, &roster, &roster).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.best().unwrap().worker.worker_id, "c");
}

// ── No match ─────────────────────────────────────────────────────────────────

#[test]
fn empty_pool_is_no_match() {
    let engine = MatchEngine::builtin();
    let empty = FakeRoster::default();
    let outcome = engine.find_best(&frontend_bug(), &empty, &empty).unwrap();
    assert_eq!(outcome, MatchOutcome::NoMatch(NoMatchReason::EmptyPool));

    let away = FakeRoster::with(vec![frontend_dev("a").unavailable()]);
    let outcome = engine.find_best(&frontend_bug(), &away, &away).unwrap();
    assert_eq!(outcome, MatchOutcome::NoMatch(NoMatchReason::EmptyPool));
    assert!(engine.recommend(&frontend_bug(), &away, &away, None).unwrap().is_empty());
}

#[test]
fn unavailable_candidates_are_never_ranked() {
    let engine = MatchEngine::builtin();
    let roster = FakeRoster::with(vec![frontend_dev("a").unavailable(), backend_dev("b")]);
    let candidates = engine.build_candidates(&roster, &roster).unwrap();
    assert_eq!(candidates.len(), 1);

    let mut pool = candidates.clone();
    pool[0].worker.available = false;
    assert!(engine.rank(&frontend_bug(), &pool).is_empty());
}

/// With a punitive base nobody scores above 0.
#[test]
fn non_positive_scores_are_excluded() {
    let mut config = MatchConfig::builtin();
    config.weights.availability_base = -100.0;
    let engine = MatchEngine::new(Arc::new(config));
    let roster = FakeRoster::with(vec![frontend_dev("a"), backend_dev("b")]);

    let outcome = engine.find_best(&frontend_bug(), &roster, &roster).unwrap();
    assert_eq!(
        outcome,
        MatchOutcome::NoMatch(NoMatchReason::NoQualifiedCandidate { evaluated: 2 })
    );
    assert!(engine.recommend(&frontend_bug(), &roster, &roster, None).unwrap().is_empty());
}

#[test]
fn directory_failure_is_an_error() {
    let engine = MatchEngine::builtin();
    let ledger = FakeRoster::default();
    let err = engine.find_best(&frontend_bug(), &DownDirectory, &ledger).unwrap_err();
    assert!(err.to_string().contains("directory unreachable"));
}

// ── Degradation ──────────────────────────────────────────────────────────────

/// One worker's ledger failure degrades only that worker's ledger factors.
#[test]
fn ledger_failure_degrades_one_worker_only() {
    let _ = env_logger::builder().is_test(true).try_init();
    let roster = FakeRoster::with(vec![frontend_dev("a"), frontend_dev("b")]).break_ledger("a");
    let engine = MatchEngine::builtin();
    let req = TaskRequirement::new(TaskType::Bug, Priority::High, "frontend");

    let ranked = engine.recommend(&req, &roster, &roster, None).unwrap();
    assert_eq!(ranked.len(), 2, "the broken worker is still scored");

    let a = ranked.iter().find(|c| c.worker.worker_id == "a").unwrap();
    let b = ranked.iter().find(|c| c.worker.worker_id == "b").unwrap();
    assert_eq!(
        a.breakdown.degraded_factors(),
        vec![Factor::WorkloadBalance, Factor::PriorityHandling, Factor::TaskTypeExperience]
    );
    assert_eq!(a.breakdown.workload_balance.value(), 0.5);
    assert!(!b.breakdown.is_degraded());
    assert_eq!(ranked[0].worker.worker_id, "b");
}

#[test]
fn malformed_skills_still_score() {
    let worker = Worker::new("m", "Mal").with_department("Frontend").with_skills("[react, css");
    let roster = FakeRoster::with(vec![worker]);
    let best = MatchEngine::builtin()
        .find_best(&frontend_bug(), &roster, &roster)
        .unwrap()
        .into_best()
        .unwrap();
    // "[react" still contains "react"; "css" parses cleanly.
    assert!((best.breakdown.domain_expertise.value() - 2.0 / 8.0).abs() < 1e-9);
}

// ── Urgency ──────────────────────────────────────────────────────────────────

#[test]
fn urgency_multiplier_is_opt_in() {
    let roster = FakeRoster::with(vec![frontend_dev("a"), backend_dev("b")]);
    let req = TaskRequirement::new(TaskType::Incident, Priority::Medium, "frontend");

    let plain = MatchEngine::builtin().recommend(&req, &roster, &roster, None).unwrap();
    assert_eq!(plain[0].breakdown.urgency, 1.5);

    let mut config = MatchConfig::builtin();
    config.apply_urgency_multiplier = true;
    let urgent = MatchEngine::new(Arc::new(config))
        .recommend(&req, &roster, &roster, None)
        .unwrap();

    for (p, u) in plain.iter().zip(&urgent) {
        assert_eq!(p.worker.worker_id, u.worker.worker_id, "ranking must not change");
        assert!((u.score - p.score * 1.5).abs() < 1e-9);
    }
}

#[test]
fn unknown_task_type_uses_generic_weighting() {
    let req = TaskRequirement::new(TaskType::parse("Epic"), Priority::Low, "frontend");
    assert!(!req.task_type.is_recognized());
    assert_eq!(req.task_type, TaskType::Other("epic".into()));
    assert_eq!(req.task_type.canonical(), "task");

    let roster = FakeRoster::with(vec![frontend_dev("a")]);
    let best = MatchEngine::builtin()
        .find_best(&req, &roster, &roster)
        .unwrap()
        .into_best()
        .unwrap();
    assert_eq!(best.breakdown.urgency, 1.0);
}

/// The JSON shape accepted on the runner's command channel.
#[test]
fn requirement_reads_from_json() {
    let raw = r#"{
        "task_type": "Incident",
        "priority": "High",
        "domain": "backend",
        "required_skills": ["python", "api"],
        "due_date": "2026-03-01T09:00:00Z"
    }"#;
    let req: TaskRequirement = serde_json::from_str(raw).unwrap();
    let due = chrono::DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let expected = TaskRequirement::new(TaskType::Incident, Priority::High, "backend")
        .with_skills(["python", "api"])
        .with_due_date(due);
    assert_eq!(req, expected);
    assert_eq!(req.estimated_hours, None);

    let echoed = serde_json::to_value(&req).unwrap();
    assert_eq!(echoed["priority"], "high");
    assert_eq!(echoed["task_type"], "incident");

    let odd: TaskRequirement =
        serde_json::from_str(r#"{"task_type":"bug","priority":" LOW ","domain":"frontend"}"#)
            .unwrap();
    assert_eq!(odd.priority, Priority::Low);
    let unknown: TaskRequirement =
        serde_json::from_str(r#"{"task_type":"bug","priority":"urgent","domain":"frontend"}"#)
            .unwrap();
    assert_eq!(unknown.priority, Priority::Medium);
}
