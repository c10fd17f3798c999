/// Task model
///
/// A task belongs to exactly one identity (`user_id`) for its whole lifetime.
/// Every read and write against the task collection carries that owner in its
/// predicate, see [`TaskScope`] and [`crate::query::TaskQuery`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('Low', 'Medium', 'High');
/// CREATE TYPE task_status AS ENUM ('Pending', 'In Progress', 'Completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(500),
///     priority task_priority NOT NULL,
///     status task_status NOT NULL DEFAULT 'Pending',
///     due_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Task priority
///
/// Variants are declared in ascending order so `Ord` matches the database enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(TaskPriority::Low),
            "Medium" => Ok(TaskPriority::Medium),
            "High" => Ok(TaskPriority::High),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task progress status
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Not started yet (default for new tasks)
    #[default]
    Pending,

    /// Work has started
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Status after a completion toggle
    ///
    /// The toggle is binary: `Completed` goes back to `Pending`, every other
    /// status (including `In Progress`) becomes `Completed`.
    pub fn toggled(self) -> TaskStatus {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            TaskStatus::Pending | TaskStatus::InProgress => TaskStatus::Completed,
        }
    }

    /// Toggles from a raw, client-reported status string
    ///
    /// Unrecognised values count as "not completed".
    pub fn toggled_from(current: &str) -> TaskStatus {
        current
            .parse::<TaskStatus>()
            .map(TaskStatus::toggled)
            .unwrap_or(TaskStatus::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "In Progress" => Ok(TaskStatus::InProgress),
            "Completed" => Ok(TaskStatus::Completed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0:?}")]
pub struct UnknownVariant(pub String);

/// A persisted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning identity, set at creation and never changed
    pub user_id: Uuid,

    /// Short title (1-100 characters)
    pub title: String,

    /// Optional longer description (at most 500 characters)
    pub description: Option<String>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Calendar due date
    pub due_date: NaiveDate,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Validated task fields shared by create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
}

/// Input for inserting a new task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    /// Owner, always the requesting identity
    pub user_id: Uuid,

    #[serde(flatten)]
    pub fields: TaskInput,
}

/// Full replacement of a task's editable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskChanges {
    #[serde(flatten)]
    pub fields: TaskInput,

    pub updated_at: DateTime<Utc>,
}

/// Status-only change written by the completion toggle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: TaskStatus,
    pub updated_at: DateTime<Utc>,
}

/// Row predicate for single-task writes: `id = ? AND user_id = ?`
///
/// This is the only authorization check on writes. An id owned by another
/// identity simply matches no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskScope {
    pub id: Uuid,
    pub owner: Uuid,
}

impl TaskScope {
    pub fn new(id: Uuid, owner: Uuid) -> Self {
        Self { id, owner }
    }

    /// Whether `task` satisfies the dual predicate
    pub fn matches(&self, task: &Task) -> bool {
        task.id == self.id && task.user_id == self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_round_trips_through_str() {
        for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
            assert_eq!(priority.as_str().parse::<TaskPriority>(), Ok(priority));
        }
        assert!("high".parse::<TaskPriority>().is_err());
        assert!("".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_status_uses_spaced_in_progress() {
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
        assert_eq!("In Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn test_toggle_is_binary() {
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn test_toggle_from_raw_status() {
        assert_eq!(TaskStatus::toggled_from("Completed"), TaskStatus::Pending);
        assert_eq!(TaskStatus::toggled_from("Pending"), TaskStatus::Completed);
        assert_eq!(TaskStatus::toggled_from("In Progress"), TaskStatus::Completed);
        assert_eq!(TaskStatus::toggled_from("garbage"), TaskStatus::Completed);
    }

    #[test]
    fn test_scope_requires_both_id_and_owner() {
        let owner = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Write report".to_string(),
            description: None,
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(TaskScope::new(task.id, owner).matches(&task));
        assert!(!TaskScope::new(task.id, Uuid::new_v4()).matches(&task));
        assert!(!TaskScope::new(Uuid::new_v4(), owner).matches(&task));
    }

    #[test]
    fn test_new_task_serializes_flat() {
        let new_task = NewTask {
            user_id: Uuid::nil(),
            fields: TaskInput {
                title: "Plan sprint".to_string(),
                description: None,
                priority: TaskPriority::Medium,
                due_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                status: TaskStatus::InProgress,
            },
        };

        let value = serde_json::to_value(&new_task).unwrap();
        assert_eq!(value["title"], "Plan sprint");
        assert_eq!(value["priority"], "Medium");
        assert_eq!(value["status"], "In Progress");
        assert_eq!(value["due_date"], "2025-01-31");
        assert!(value["description"].is_null());
        assert!(value.get("fields").is_none());
    }
}
