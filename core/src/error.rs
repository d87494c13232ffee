use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Worker '{worker_id}' not found")]
    WorkerNotFound { worker_id: String },

    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: String },

    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Ledger unavailable for worker '{worker_id}': {reason}")]
    Ledger { worker_id: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MatchResult<T> = Result<T, MatchError>;
