/// Task model and status enumeration
///
/// Tasks are the core entity of TaskTrack. A task is created by an owner or
/// project manager, optionally assigned to an employee, and moves through a
/// small fixed state machine as the assignee accepts and completes it.
///
/// # State Machine
///
/// ```text
/// pending → in-progress → completed
/// ```
///
/// Owners and project managers may correct status in any direction; the
/// assigned employee's self-service path is forward-only and gated on
/// acceptance (see the `lifecycle` module).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('high', 'medium', 'low');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'pending',
///     accepted BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date TIMESTAMPTZ,
///     assigned_to UUID,
///     created_by UUID NOT NULL,
///     comments JSONB NOT NULL DEFAULT '[]',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `assigned_to` and `created_by` are plain UUIDs without foreign keys:
/// user deletion leaves dangling references that readers tolerate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created, waiting for the assignee to accept
    Pending,

    /// Accepted and being worked on
    InProgress,

    /// Finished (terminal for the employee path)
    Completed,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Checks if the status is terminal on the forward path
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Checks if target is the next step on the forward path
    ///
    /// This is the employee-facing progression; privileged roles are not
    /// bound by it (see `lifecycle`).
    pub fn is_forward_step(&self, target: TaskStatus) -> bool {
        matches!(
            (self, target),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Completed)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

/// A single comment embedded in a task
///
/// Comments form an append-only sequence owned by the task; they have no
/// independent lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID
    pub id: Uuid,

    /// Comment body
    pub text: String,

    /// User who wrote the comment (may dangle after user deletion)
    pub author: Uuid,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment stamped with the current time
    pub fn new(author: Uuid, text: impl Into<String>) -> Self {
        Comment {
            id: Uuid::new_v4(),
            text: text.into(),
            author,
            created_at: Utc::now(),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Title, required and non-empty
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Priority, defaults to medium
    pub priority: TaskPriority,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Whether the assignee has acknowledged the assignment
    ///
    /// Invariants: `accepted` never coexists with `Pending`, and
    /// `Completed` implies `accepted`.
    pub accepted: bool,

    /// Due date, used by the reminder sweep
    pub due_date: Option<DateTime<Utc>>,

    /// Assigned employee (None until assignment; may dangle)
    pub assigned_to: Option<Uuid>,

    /// User who created the task (may dangle)
    pub created_by: Uuid,

    /// Append-only comment sequence, oldest first
    pub comments: Vec<Comment>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Checks if the given user is the current assignee
    pub fn is_assigned_to(&self, user_id: Uuid) -> bool {
        self.assigned_to == Some(user_id)
    }

    /// Checks the acceptance/status invariants
    pub fn invariants_hold(&self) -> bool {
        let accepted_never_pending = !(self.accepted && self.status == TaskStatus::Pending);
        let completed_implies_accepted = self.status != TaskStatus::Completed || self.accepted;
        accepted_never_pending && completed_implies_accepted
    }
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Title, required and non-empty
    pub title: String,

    /// Description (empty string if omitted)
    pub description: String,

    /// Priority
    pub priority: TaskPriority,

    /// Due date
    pub due_date: Option<DateTime<Utc>>,

    /// Initial assignee, if any
    pub assigned_to: Option<Uuid>,

    /// Creating user
    pub created_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(status: TaskStatus, accepted: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Fix bug".to_string(),
            description: String::new(),
            priority: TaskPriority::High,
            status,
            accepted,
            due_date: None,
            assigned_to: None,
            created_by: Uuid::new_v4(),
            comments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_status_serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"in-progress\"").unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_forward_steps() {
        assert!(TaskStatus::Pending.is_forward_step(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.is_forward_step(TaskStatus::Completed));

        assert!(!TaskStatus::Pending.is_forward_step(TaskStatus::Completed));
        assert!(!TaskStatus::InProgress.is_forward_step(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.is_forward_step(TaskStatus::InProgress));
    }

    #[test]
    fn test_priority_default() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_invariants() {
        assert!(sample_task(TaskStatus::Pending, false).invariants_hold());
        assert!(sample_task(TaskStatus::InProgress, true).invariants_hold());
        assert!(sample_task(TaskStatus::Completed, true).invariants_hold());

        // accepted may never coexist with pending
        assert!(!sample_task(TaskStatus::Pending, true).invariants_hold());

        // completed implies accepted
        assert!(!sample_task(TaskStatus::Completed, false).invariants_hold());
    }

    #[test]
    fn test_is_assigned_to() {
        let employee = Uuid::new_v4();
        let mut task = sample_task(TaskStatus::Pending, false);
        assert!(!task.is_assigned_to(employee));

        task.assigned_to = Some(employee);
        assert!(task.is_assigned_to(employee));
        assert!(!task.is_assigned_to(Uuid::new_v4()));
    }
}
