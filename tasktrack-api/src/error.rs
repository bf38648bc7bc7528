/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts
/// domain errors to the appropriate status codes:
///
/// | Domain outcome        | Status |
/// |-----------------------|--------|
/// | InvalidCredentials    | 401    |
/// | Forbidden             | 403    |
/// | NotFound              | 404    |
/// | DuplicateEmail        | 409    |
/// | InvalidTransition     | 409    |
/// | Validation / weak pwd | 422    |
/// | Storage failure       | 500    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tasktrack_shared::auth::jwt::JwtError;
use tasktrack_shared::auth::middleware::AuthError;
use tasktrack_shared::services::registry::RegistryError;
use tasktrack_shared::services::tasks::TaskError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate email, invalid transition
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "forbidden", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Converts `validator` derive output into a 422 with field details
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(details)
}

/// Convert registry errors to API errors
impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateEmail => {
                ApiError::Conflict("Email already exists".to_string())
            }
            RegistryError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            RegistryError::WeakCredential(msg) => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: msg,
                }])
            }
            RegistryError::Forbidden(msg) => ApiError::Forbidden(msg),
            RegistryError::NotFound => ApiError::NotFound("User not found".to_string()),
            RegistryError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            RegistryError::Store(msg) => ApiError::InternalError(format!("Storage error: {}", msg)),
        }
    }
}

/// Convert task errors to API errors
impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => ApiError::NotFound("Task not found".to_string()),
            TaskError::Forbidden(msg) => ApiError::Forbidden(msg),
            TaskError::Lifecycle(e) => ApiError::Conflict(e.to_string()),
            TaskError::Validation(msg) => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "request".to_string(),
                    message: msg,
                }])
            }
            TaskError::Store(msg) => ApiError::InternalError(format!("Storage error: {}", msg)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert auth middleware errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::UnknownUser => ApiError::Unauthorized("Unknown user".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktrack_shared::lifecycle::LifecycleError;
    use tasktrack_shared::models::task::TaskStatus;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_registry_error_mapping() {
        let err: ApiError = RegistryError::DuplicateEmail.into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = RegistryError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = RegistryError::WeakCredential("too short".to_string()).into();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[test]
    fn test_task_error_mapping() {
        let err: ApiError = TaskError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = TaskError::Lifecycle(LifecycleError::InvalidTransition {
            from: TaskStatus::Pending,
            to: TaskStatus::Completed,
        })
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_into_response_statuses() {
        let response = ApiError::Forbidden("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError::ValidationError(vec![]).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = ApiError::Conflict("dup".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
