//! Task requirements and stored task rows.

use crate::types::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task type. Open set: unrecognised values are kept verbatim and
/// weighted as a generic `task`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    Bug,
    Incident,
    Feature,
    Story,
    Task,
    Other(String),
}

impl TaskType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "bug" => Self::Bug,
            "incident" => Self::Incident,
            "feature" => Self::Feature,
            "story" => Self::Story,
            "task" | "" => Self::Task,
            other => Self::Other(other.to_string()),
        }
    }

    /// The label as given (lowercase). Used for experience lookups.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bug => "bug",
            Self::Incident => "incident",
            Self::Feature => "feature",
            Self::Story => "story",
            Self::Task => "task",
            Self::Other(s) => s.as_str(),
        }
    }

    /// The label used for weighting: unknown types collapse to `task`.
    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Incident => "incident",
            Self::Feature => "feature",
            Self::Story => "story",
            Self::Task | Self::Other(_) => "task",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for TaskType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TaskType> for String {
    fn from(t: TaskType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Case-insensitive parse. Unknown values fall back to `Medium`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured requirements for one matching call. Immutable for the
/// duration of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequirement {
    pub task_type: TaskType,
    pub priority: Priority,
    /// Free-form key into the domain taxonomy.
    pub domain: String,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskRequirement {
    pub fn new(task_type: TaskType, priority: Priority, domain: impl Into<String>) -> Self {
        Self {
            task_type,
            priority,
            domain: domain.into(),
            required_skills: None,
            estimated_hours: None,
            due_date: None,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Non-empty required skills, trimmed, empty entries dropped.
    /// `None` when the caller gave no usable skill requirement.
    pub fn skill_requirements(&self) -> Option<Vec<String>> {
        let skills: Vec<String> = self
            .required_skills
            .as_ref()?
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        (!skills.is_empty()).then_some(skills)
    }
}

// ── Stored tasks ──────────────────────────────────────────────────

/// Fresh task id of the form `{prefix}-{uuid}`. Unique across runs
/// against the same database.
pub fn new_task_id(prefix: &str) -> TaskId {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Unassigned,
    Assigned,
    Closed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "unassigned" => Some(Self::Unassigned),
            "assigned" => Some(Self::Assigned),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A task as held by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Origin tag, e.g. `"jira-bug"`, `"slack-incident"`, `"manual"`.
    pub source: String,
    pub estimated_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
}

impl TaskRecord {
    pub fn new(task_id: impl Into<TaskId>, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
            description: String::new(),
            priority,
            source: "manual".into(),
            estimated_hours: None,
            due_date: None,
            status: TaskStatus::Unassigned,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }
}
