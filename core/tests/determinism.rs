//! Two runners, same seed, same tasks.
//! They must seed identical rosters and make identical picks.

use taskmatch_core::{
    config::MatchConfig,
    engine::MatchEngine,
    orchestrator::Orchestrator,
    roster_generator::{RosterGenerator, RosterRng},
    store::LedgerStore,
    task::{Priority, TaskRecord, TaskRequirement, TaskType},
};

fn seeded_store(seed: u64) -> LedgerStore {
    let store = LedgerStore::in_memory_migrated().expect("in-memory store");
    let taxonomy = MatchConfig::builtin().taxonomy;
    let mut gen = RosterGenerator::new(&taxonomy, seed);
    let workers = gen.workers(40);
    for w in &workers {
        store.insert_worker(w).expect("insert worker");
    }
    for (task, entry) in gen.history(&workers, 5) {
        store.insert_task(&task).expect("insert task");
        store.insert_assignment(&entry).expect("insert assignment");
    }
    store
}

/// Assign `count` generated tasks and return the chosen worker ids.
fn run(seed: u64, count: usize) -> Vec<Option<String>> {
    let store = seeded_store(seed);
    let orch = Orchestrator::new(MatchEngine::builtin());
    let domains: Vec<String> = orch.engine().config().taxonomy.domains().map(str::to_string).collect();
    let types = [TaskType::Bug, TaskType::Incident, TaskType::Feature, TaskType::Story];
    let priorities = [Priority::Low, Priority::Medium, Priority::High];
    let mut rng = RosterRng::new(seed.rotate_left(17));

    (0..count)
        .map(|i| {
            let priority = *rng.pick(&priorities);
            let req = TaskRequirement::new(rng.pick(&types).clone(), priority, rng.pick(&domains).clone())
                .with_estimated_hours((1 + rng.next_u64_below(12)) as f64);
            let task = TaskRecord::new(format!("D-{i:03}"), format!("Generated {i}"), priority)
                .with_estimated_hours(req.estimated_hours.unwrap_or(0.0));
            store.insert_task(&task).expect("insert task");
            orch.assign(&task, &req, &store, &store, &store)
                .expect("assign")
                .record()
                .map(|r| r.worker_id.clone())
        })
        .collect()
}

#[test]
fn same_seed_produces_identical_rosters() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let a = seeded_store(SEED);
    let b = seeded_store(SEED);
    assert_eq!(a.all_workers().unwrap(), b.all_workers().unwrap());
    assert_eq!(a.assignment_count().unwrap(), b.assignment_count().unwrap());
}

#[test]
fn same_seed_produces_identical_assignments() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let picks_a = run(SEED, 60);
    let picks_b = run(SEED, 60);

    assert_eq!(picks_a.len(), picks_b.len());
    for (i, (a, b)) in picks_a.iter().zip(picks_b.iter()).enumerate() {
        assert_eq!(a, b, "Assignments diverged at task {i}:\n  A: {a:?}\n  B: {b:?}");
    }
    assert!(picks_a.iter().any(Option::is_some), "nobody was ever assigned");
}
