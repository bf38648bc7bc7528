/// User management endpoints
///
/// # Endpoints
///
/// - `GET    /v1/users` - List users (owner/project manager)
/// - `POST   /v1/users` - Provision a user (owner only)
/// - `PUT    /v1/users/:id/role` - Change a user's role
/// - `DELETE /v1/users/:id` - Delete a user (owner only)
///
/// Provisioning generates a temporary password that is returned exactly
/// once in the response for out-of-band delivery to the new user.

use crate::{
    app::AppState,
    error::{validation_error, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::middleware::AuthContext,
    models::user::{Role, User},
};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Role to assign (owner is rejected)
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

/// Create user response
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    /// The created user
    pub user: User,

    /// Temporary password for out-of-band delivery; not stored in clear
    pub temp_password: String,
}

/// Role change request
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// New role
    pub role: Role,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Confirmation message
    pub message: String,
}

/// Lists all users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.registry.list_users(auth.role).await?;
    Ok(Json(users))
}

/// Provisions a user account with a temporary password
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<CreateUserResponse>> {
    req.validate().map_err(validation_error)?;

    let (user, temp_password) = state
        .registry
        .create_employee(auth.role, &req.email, &req.name, req.role)
        .await?;

    Ok(Json(CreateUserResponse {
        user,
        temp_password,
    }))
}

/// Changes a user's role
pub async fn change_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<User>> {
    let user = state.registry.change_role(auth.role, id, req.role).await?;
    Ok(Json(user))
}

/// Deletes a user
///
/// Tasks referencing the user keep their dangling references.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    state.registry.delete_user(auth.role, id).await?;

    Ok(Json(DeleteResponse {
        message: "User deleted successfully".to_string(),
    }))
}
