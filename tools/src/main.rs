//! match-runner: headless runner for the task matching engine.
//!
//! Usage:
//!   match-runner --seed 12345 --workers 40 --db run.db
//!   match-runner --seed 12345 --ipc-mode

use anyhow::Result;
use serde_json::json;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use taskmatch_core::{
    config::MatchConfig,
    engine::{MatchEngine, MatchOutcome},
    orchestrator::{AssignmentOutcome, Orchestrator},
    roster_generator::RosterGenerator,
    store::LedgerStore,
    task::{new_task_id, Priority, TaskRecord, TaskRequirement, TaskStatus, TaskType},
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    FindBest {
        #[serde(flatten)]
        requirement: TaskRequirement,
    },
    Recommend {
        #[serde(default)]
        limit: Option<usize>,
        #[serde(flatten)]
        requirement: TaskRequirement,
    },
    Assign {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(flatten)]
        requirement: TaskRequirement,
    },
    Quit,
}

struct DemoTask {
    title: &'static str,
    description: &'static str,
    task_type: TaskType,
    priority: Priority,
    domain: &'static str,
    skills: &'static [&'static str],
    hours: f64,
}

fn demo_tasks() -> Vec<DemoTask> {
    vec![
        DemoTask {
            title: "Checkout page crashes on Safari",
            description: "Customers on Safari 17 get a blank page after adding a coupon.",
            task_type: TaskType::Bug,
            priority: Priority::High,
            domain: "frontend",
            skills: &["react", "javascript"],
            hours: 4.0,
        },
        DemoTask {
            title: "Payments API timing out",
            description: "p99 latency on /charge is above 8s since the last deploy.",
            task_type: TaskType::Incident,
            priority: Priority::High,
            domain: "backend",
            skills: &["python", "api", "database"],
            hours: 6.0,
        },
        DemoTask {
            title: "Move staging to Kubernetes",
            description: "Replace the staging VM fleet with a managed cluster.",
            task_type: TaskType::Feature,
            priority: Priority::Medium,
            domain: "devops",
            skills: &["kubernetes", "docker"],
            hours: 24.0,
        },
        DemoTask {
            title: "Churn dashboard",
            description: "Weekly churn by cohort for the growth team.",
            task_type: TaskType::Story,
            priority: Priority::Low,
            domain: "data",
            skills: &[],
            hours: 12.0,
        },
        DemoTask {
            title: "Review login rate limiting",
            description: "Check brute-force protection on the login endpoint.",
            task_type: TaskType::Task,
            priority: Priority::Medium,
            domain: "security",
            skills: &["authentication"],
            hours: 3.0,
        },
        DemoTask {
            title: "Refresh onboarding illustrations",
            description: "New brand palette for the onboarding screens.",
            task_type: TaskType::Task,
            priority: Priority::Low,
            domain: "design",
            skills: &["figma"],
            hours: 8.0,
        },
    ]
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let worker_count = parse_arg(&args, "--workers", 30usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    if !ipc_mode {
        println!("Task matcher: match-runner");
        println!("  seed:      {seed}");
        println!("  workers:   {worker_count}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let config = match MatchConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{e}; using built-in taxonomy and weights");
            MatchConfig::builtin()
        }
    };

    let store = if db == ":memory:" {
        LedgerStore::in_memory()?
    } else {
        LedgerStore::open(db)?
    };
    store.migrate()?;

    seed_roster(&store, &config, seed, worker_count)?;

    let orchestrator = Orchestrator::new(MatchEngine::new(Arc::new(config)));

    if ipc_mode {
        run_ipc_loop(&orchestrator, &store)?;
    } else {
        run_demo(&orchestrator, &store)?;
        print_summary(&store)?;
    }

    Ok(())
}

/// Load a deterministic roster and its assignment history. Skipped when
/// the database already holds workers.
fn seed_roster(store: &LedgerStore, config: &MatchConfig, seed: u64, count: usize) -> Result<()> {
    if store.worker_count()? > 0 {
        log::info!("Roster already present, not seeding");
        return Ok(());
    }

    let mut gen = RosterGenerator::new(&config.taxonomy, seed);
    let workers = gen.workers(count);
    for w in &workers {
        store.insert_worker(w)?;
    }
    let history = gen.history(&workers, 4);
    for (task, entry) in &history {
        store.insert_task(task)?;
        store.insert_assignment(entry)?;
    }
    log::info!(
        "Seeded {} workers and {} historical assignments (seed {seed})",
        workers.len(),
        history.len()
    );
    Ok(())
}

fn run_demo(orchestrator: &Orchestrator, store: &LedgerStore) -> Result<()> {
    println!("=== ASSIGNMENTS ===");
    for demo in demo_tasks() {
        let task = TaskRecord::new(new_task_id("demo"), demo.title, demo.priority)
            .with_description(demo.description)
            .with_estimated_hours(demo.hours);
        store.insert_task(&task)?;

        let mut req = TaskRequirement::new(demo.task_type, demo.priority, demo.domain)
            .with_estimated_hours(demo.hours);
        if !demo.skills.is_empty() {
            req = req.with_skills(demo.skills.iter().copied());
        }

        match orchestrator.assign(&task, &req, store, store, store)? {
            AssignmentOutcome::Assigned { record, score, .. } => {
                let worker = store.get_worker(&record.worker_id)?;
                println!(
                    "  {:<34} -> {} ({:.1})",
                    task.title,
                    worker.name,
                    score.unwrap_or(0.0)
                );
            }
            AssignmentOutcome::Unassigned(reason) => {
                println!("  {:<34} -> unassigned: {reason}", task.title);
            }
        }
    }
    println!();
    Ok(())
}

fn run_ipc_loop(orchestrator: &Orchestrator, store: &LedgerStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = handle_command(orchestrator, store, cmd)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }));
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    orchestrator: &Orchestrator,
    store: &LedgerStore,
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    let engine = orchestrator.engine();
    match cmd {
        IpcCommand::FindBest { requirement } => {
            let outcome = engine.find_best(&requirement, store, store)?;
            Ok(match outcome {
                MatchOutcome::Matched(best) => json!({ "best": best }),
                MatchOutcome::NoMatch(reason) => json!({ "best": null, "reason": reason }),
            })
        }
        IpcCommand::Recommend { limit, requirement } => {
            let candidates = engine.recommend(&requirement, store, store, limit)?;
            Ok(json!({ "candidates": candidates }))
        }
        IpcCommand::Assign {
            title,
            description,
            requirement,
        } => {
            let mut task = TaskRecord::new(new_task_id("ipc"), title, requirement.priority)
                .with_description(description)
                .with_source(format!("ipc-{}", requirement.task_type));
            if let Some(hours) = requirement.estimated_hours {
                task = task.with_estimated_hours(hours);
            }
            task.due_date = requirement.due_date;
            store.insert_task(&task)?;

            Ok(match orchestrator.assign(&task, &requirement, store, store, store)? {
                AssignmentOutcome::Assigned {
                    record,
                    notification,
                    score,
                } => json!({
                    "assignment": record,
                    "notification": notification,
                    "score": score,
                }),
                AssignmentOutcome::Unassigned(reason) => {
                    json!({ "assignment": null, "task_id": task.task_id, "reason": reason })
                }
            })
        }
        IpcCommand::Quit => Ok(serde_json::Value::Null),
    }
}

fn print_summary(store: &LedgerStore) -> Result<()> {
    let workers = store.worker_count()?;
    let available = store.all_workers()?.iter().filter(|w| w.available).count();
    let unassigned = store.task_count(TaskStatus::Unassigned)?;
    let assigned = store.task_count(TaskStatus::Assigned)?;
    let closed = store.task_count(TaskStatus::Closed)?;
    let notifications = store.pending_notifications()?.len();

    println!("=== RUN SUMMARY ===");
    println!("  workers:        {workers} ({available} available)");
    println!("  assignments:    {}", store.assignment_count()?);
    println!("  tasks open:     {unassigned}");
    println!("  tasks assigned: {assigned}");
    println!("  tasks closed:   {closed}");
    println!("  matches:        {}", store.decision_count("match_selected")?);
    println!("  no matches:     {}", store.decision_count("no_match")?);
    println!("  outbox:         {notifications} pending");
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
