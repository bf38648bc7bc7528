/// Task lifecycle service
///
/// Applies the authorization policy and the lifecycle state machine to the
/// task store, and fans successful mutations out through the notification
/// dispatcher. Policy is always evaluated before the store is consulted,
/// so error content never discloses the existence of a task to a caller
/// who may not see it: an employee probing a foreign or non-existent task
/// id gets `Forbidden` either way.

use crate::auth::middleware::AuthContext;
use crate::auth::policy::{self, TaskAction};
use crate::events::{NotificationDispatcher, TaskEvent, TaskEventKind};
use crate::lifecycle::{self, LifecycleError};
use crate::models::task::{Comment, NewTask, Task, TaskPriority, TaskStatus};
use crate::models::user::Role;
use crate::store::{StoreError, TaskStore};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Result type for task operations
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors surfaced by task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Task does not exist
    #[error("Task not found")]
    NotFound,

    /// Actor may not perform this action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested status transition is illegal
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Missing or malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(String),
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        TaskError::Store(err.to_string())
    }
}

/// Input for creating a task through the service
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

/// Task service over a task store and the dispatcher
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    dispatcher: NotificationDispatcher,
}

impl TaskService {
    /// Creates a task service
    pub fn new(store: Arc<dyn TaskStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Creates a task
    ///
    /// Owners and project managers only. The title must be non-empty. An
    /// initial assignee may be set; the assignee is notified.
    pub async fn create(&self, actor: AuthContext, input: CreateTaskInput) -> TaskResult<Task> {
        if !policy::allows(actor.role, TaskAction::Create) {
            return Err(TaskError::Forbidden(
                "Only owners and project managers may create tasks".to_string(),
            ));
        }

        if input.title.trim().is_empty() {
            return Err(TaskError::Validation("Title must not be empty".to_string()));
        }

        let task = self
            .store
            .create(NewTask {
                title: input.title,
                description: input.description,
                priority: input.priority,
                due_date: input.due_date,
                assigned_to: input.assigned_to,
                created_by: actor.user_id,
            })
            .await?;

        tracing::info!(task_id = %task.id, "Created task");

        if let Some(assignee) = task.assigned_to {
            self.notify(TaskEventKind::Assigned, &task, assignee, actor.user_id);
        }

        Ok(task)
    }

    /// Fetches a single task, honoring visibility rules
    pub async fn get(&self, actor: AuthContext, task_id: Uuid) -> TaskResult<Task> {
        self.load_visible(actor, task_id).await
    }

    /// Lists the tasks visible to the actor
    ///
    /// Owners and project managers see everything; employees see only
    /// tasks assigned to them. Both newest first.
    pub async fn list_for(&self, actor: AuthContext) -> TaskResult<Vec<Task>> {
        if policy::allows(actor.role, TaskAction::ListAll) {
            Ok(self.store.list_all().await?)
        } else {
            Ok(self.store.list_by_assignee(actor.user_id).await?)
        }
    }

    /// Accepts an assignment
    ///
    /// Only the current assignee may accept. Acceptance sets the flag and
    /// promotes a pending task to in-progress.
    pub async fn accept(&self, actor: AuthContext, task_id: Uuid) -> TaskResult<Task> {
        let task = self.load_visible(actor, task_id).await?;

        if !task.is_assigned_to(actor.user_id) {
            return Err(TaskError::Forbidden(
                "Only the assignee may accept a task".to_string(),
            ));
        }

        let change = lifecycle::plan_accept(&task)?;
        let task = self
            .store
            .set_status(task_id, change.status, change.accepted)
            .await?
            .ok_or(TaskError::NotFound)?;

        tracing::info!(task_id = %task.id, "Task accepted");
        self.notify(
            TaskEventKind::StatusChanged,
            &task,
            task.created_by,
            actor.user_id,
        );

        Ok(task)
    }

    /// Sets a task's status
    ///
    /// Owners and project managers may correct status freely; the
    /// assigned employee is held to the forward-only path.
    pub async fn set_status(
        &self,
        actor: AuthContext,
        task_id: Uuid,
        target: TaskStatus,
    ) -> TaskResult<Task> {
        let task = self.load_visible(actor, task_id).await?;

        let change = lifecycle::plan_status_change(actor.role, &task, target)?;
        let task = self
            .store
            .set_status(task_id, change.status, change.accepted)
            .await?
            .ok_or(TaskError::NotFound)?;

        tracing::info!(task_id = %task.id, status = %task.status, "Status changed");
        self.notify(
            TaskEventKind::StatusChanged,
            &task,
            task.created_by,
            actor.user_id,
        );

        Ok(task)
    }

    /// Changes a task's assignee
    ///
    /// Legal in any state; resets the task to pending with acceptance
    /// cleared so the new assignee must acknowledge it themselves.
    pub async fn assign(
        &self,
        actor: AuthContext,
        task_id: Uuid,
        assignee: Option<Uuid>,
    ) -> TaskResult<Task> {
        if !policy::allows(actor.role, TaskAction::Assign) {
            return Err(TaskError::Forbidden(
                "Only owners and project managers may assign tasks".to_string(),
            ));
        }

        let reset = lifecycle::reassignment_reset();
        let task = self
            .store
            .set_assignee(task_id, assignee, reset.status, reset.accepted)
            .await?
            .ok_or(TaskError::NotFound)?;

        tracing::info!(task_id = %task.id, "Task reassigned");

        if let Some(assignee) = task.assigned_to {
            self.notify(TaskEventKind::Assigned, &task, assignee, actor.user_id);
        }

        Ok(task)
    }

    /// Appends a comment
    ///
    /// Any role may comment; employees only on their own tasks. The
    /// creator and the assignee are notified, excluding the author.
    pub async fn add_comment(
        &self,
        actor: AuthContext,
        task_id: Uuid,
        text: &str,
    ) -> TaskResult<Task> {
        if text.trim().is_empty() {
            return Err(TaskError::Validation(
                "Comment text must not be empty".to_string(),
            ));
        }

        // Visibility check happens before the append
        self.load_visible(actor, task_id).await?;

        let task = self
            .store
            .append_comment(task_id, Comment::new(actor.user_id, text))
            .await?
            .ok_or(TaskError::NotFound)?;

        let mut recipients = vec![task.created_by];
        if let Some(assignee) = task.assigned_to {
            if assignee != task.created_by {
                recipients.push(assignee);
            }
        }
        for recipient in recipients {
            self.notify(TaskEventKind::CommentAdded, &task, recipient, actor.user_id);
        }

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Owner-only; terminal, no soft state.
    pub async fn delete(&self, actor: AuthContext, task_id: Uuid) -> TaskResult<()> {
        if !policy::allows(actor.role, TaskAction::Delete) {
            return Err(TaskError::Forbidden(
                "Only owners may delete tasks".to_string(),
            ));
        }

        let deleted = self.store.delete(task_id).await?;
        if !deleted {
            return Err(TaskError::NotFound);
        }

        tracing::info!(task_id = %task_id, "Deleted task");
        Ok(())
    }

    /// Loads a task the actor may act on
    ///
    /// Employees get `Forbidden` for foreign and non-existent ids alike,
    /// so error content never reveals which of the two it was.
    async fn load_visible(&self, actor: AuthContext, task_id: Uuid) -> TaskResult<Task> {
        match self.store.find_by_id(task_id).await? {
            Some(task) => {
                if policy::can_touch_task(actor.role, actor.user_id, &task) {
                    Ok(task)
                } else {
                    Err(TaskError::Forbidden(
                        "Task is not assigned to you".to_string(),
                    ))
                }
            }
            None => match actor.role {
                Role::Employee => Err(TaskError::Forbidden(
                    "Task is not assigned to you".to_string(),
                )),
                Role::Owner | Role::ProjectManager => Err(TaskError::NotFound),
            },
        }
    }

    /// Fire-and-forget event emission, skipping self-notification
    fn notify(&self, kind: TaskEventKind, task: &Task, recipient: Uuid, actor_id: Uuid) {
        if recipient == actor_id {
            return;
        }

        self.dispatcher.publish(TaskEvent::new(
            kind,
            task.id,
            recipient,
            json!({
                "title": task.title,
                "status": task.status,
                "accepted": task.accepted,
            }),
        ));
    }
}
