pub mod assignment;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod orchestrator;
pub mod roster_generator;
pub mod scoring;
pub mod skills;
pub mod store;
pub mod task;
pub mod types;
pub mod worker;
pub mod workload;
