/// Storage traits for users and tasks
///
/// The services operate against these traits rather than a concrete
/// database, mirroring the document-store collaborator contract: find by
/// id, find all, filter by a reference field, partial update, delete.
///
/// Two implementations ship with the crate:
///
/// - [`postgres::PgStore`]: the production backend over sqlx/PostgreSQL
/// - [`memory::MemoryStore`]: a thread-safe in-memory backend used by the
///   test suites and for running the server without a database
///
/// # Concurrency contract
///
/// Implementations provide last-write-wins semantics per record. Status
/// updates and comment appends are separate partial updates so a comment
/// append never clobbers a concurrent status change (and vice versa).
/// There is no optimistic-concurrency token.

pub mod memory;
pub mod postgres;

use crate::models::task::{Comment, NewTask, Task, TaskStatus};
use crate::models::user::{NewUser, Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email already exists
    #[error("Email already exists")]
    DuplicateEmail,

    /// Backend failure (connection lost, poisoned lock, bad data)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // Unique constraint on users.email
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("email") {
                    return StoreError::DuplicateEmail;
                }
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Persistence contract for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] when the email is taken.
    async fn create(&self, data: NewUser) -> StoreResult<User>;

    /// Finds a user by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Finds a user by email (case-sensitive match)
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Lists all users, newest first
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Counts all users
    async fn count(&self) -> StoreResult<i64>;

    /// Updates a user's role, returning the updated record if found
    async fn update_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>>;

    /// Deletes a user, returning whether a record was removed
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Persistence contract for task records
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task in pending state
    async fn create(&self, data: NewTask) -> StoreResult<Task>;

    /// Finds a task by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists all tasks, newest first
    async fn list_all(&self) -> StoreResult<Vec<Task>>;

    /// Lists tasks assigned to a user, newest first
    async fn list_by_assignee(&self, user_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Writes the status/accepted pair, returning the updated task if found
    ///
    /// This is a partial update touching only the two lifecycle fields.
    async fn set_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        accepted: bool,
    ) -> StoreResult<Option<Task>>;

    /// Changes the assignee together with the lifecycle reset fields
    async fn set_assignee(
        &self,
        id: Uuid,
        assignee: Option<Uuid>,
        status: TaskStatus,
        accepted: bool,
    ) -> StoreResult<Option<Task>>;

    /// Appends a comment, returning the updated task if found
    ///
    /// Implementations append to the stored sequence rather than
    /// rewriting the whole record, so concurrent status updates survive.
    async fn append_comment(&self, id: Uuid, comment: Comment) -> StoreResult<Option<Task>>;

    /// Deletes a task, returning whether a record was removed
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Lists tasks with a due date at or before the deadline
    ///
    /// Used by the reminder sweep; completed tasks are excluded.
    async fn list_due_before(&self, deadline: DateTime<Utc>) -> StoreResult<Vec<Task>>;
}
