/// Task lifecycle endpoints
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - List visible tasks (role-filtered)
/// - `POST   /v1/tasks` - Create task (owner/project manager)
/// - `GET    /v1/tasks/:id` - Fetch one task
/// - `PUT    /v1/tasks/:id/status` - Set status
/// - `POST   /v1/tasks/:id/accept` - Accept assignment
/// - `PUT    /v1/tasks/:id/assignee` - Reassign (resets acceptance)
/// - `POST   /v1/tasks/:id/comments` - Append comment
/// - `DELETE /v1/tasks/:id` - Delete (owner only)
///
/// All routes require authentication; authorization is decided by the
/// domain policy, so an employee probing someone else's task id receives
/// 403 rather than 404.

use crate::{
    app::AppState,
    error::{validation_error, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskPriority, TaskStatus},
    services::tasks::CreateTaskInput,
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title (required, non-empty)
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Priority (defaults to medium)
    #[serde(default)]
    pub priority: TaskPriority,

    /// Due date
    pub due_date: Option<DateTime<Utc>>,

    /// Initial assignee
    pub assigned_to: Option<Uuid>,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status
    pub status: TaskStatus,
}

/// Assignee update request
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// New assignee (null to unassign)
    pub assigned_to: Option<Uuid>,
}

/// Comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    /// Comment body
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub text: String,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Confirmation message
    pub message: String,
}

/// Lists the tasks visible to the caller
///
/// Owners and project managers see everything; employees see only tasks
/// assigned to them. Newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_for(auth).await?;
    Ok(Json(tasks))
}

/// Creates a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_error)?;

    let task = state
        .tasks
        .create(
            auth,
            CreateTaskInput {
                title: req.title,
                description: req.description,
                priority: req.priority,
                due_date: req.due_date,
                assigned_to: req.assigned_to,
            },
        )
        .await?;

    Ok(Json(task))
}

/// Fetches a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.get(auth, id).await?;
    Ok(Json(task))
}

/// Sets a task's status
///
/// # Errors
///
/// - `409 Conflict`: illegal transition for this actor
/// - `403 Forbidden`: task not assigned to the calling employee
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.set_status(auth, id, req.status).await?;
    Ok(Json(task))
}

/// Accepts an assignment
///
/// Sets the acceptance flag and promotes a pending task to in-progress.
pub async fn accept_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.accept(auth, id).await?;
    Ok(Json(task))
}

/// Changes a task's assignee
///
/// Resets the task to pending with acceptance cleared.
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.assign(auth, id, req.assigned_to).await?;
    Ok(Json(task))
}

/// Appends a comment
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_error)?;

    let task = state.tasks.add_comment(auth, id, &req.text).await?;
    Ok(Json(task))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    state.tasks.delete(auth, id).await?;

    Ok(Json(DeleteResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
