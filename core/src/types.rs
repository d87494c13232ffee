//! Shared primitive types used across the matching engine.

/// A stable, unique identifier for a worker in the roster.
pub type WorkerId = String;

/// A stable, unique identifier for a task.
pub type TaskId = String;

/// A stable, unique identifier for an assignment record.
pub type AssignmentId = String;
