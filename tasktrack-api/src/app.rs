/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tasktrack_shared::auth::{jwt, middleware::AuthContext};
use tasktrack_shared::events::NotificationDispatcher;
use tasktrack_shared::services::registry::RegistryService;
use tasktrack_shared::services::tasks::TaskService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the
/// services are cheap to clone (Arc internally).
#[derive(Clone)]
pub struct AppState {
    /// User registry service
    pub registry: RegistryService,

    /// Task lifecycle service
    pub tasks: TaskService,

    /// Notification fan-out
    pub dispatcher: NotificationDispatcher,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        registry: RegistryService,
        tasks: TaskService,
        dispatcher: NotificationDispatcher,
        config: Config,
    ) -> Self {
        Self {
            registry,
            tasks,
            dispatcher,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register         # Public
///     │   ├── POST /login            # Public
///     │   ├── POST /refresh          # Public
///     │   └── GET  /me               # Authenticated
///     ├── /tasks/                    # Authenticated
///     │   ├── GET    /               # Role-filtered list
///     │   ├── POST   /               # Create (owner/pm)
///     │   ├── GET    /:id
///     │   ├── PUT    /:id/status
///     │   ├── POST   /:id/accept
///     │   ├── PUT    /:id/assignee   # Owner/pm, resets acceptance
///     │   ├── POST   /:id/comments
///     │   └── DELETE /:id            # Owner only
///     ├── /users/                    # Authenticated
///     │   ├── GET    /               # Owner/pm
///     │   ├── POST   /               # Owner, returns temp password
///     │   ├── PUT    /:id/role
///     │   └── DELETE /:id            # Owner only
///     └── /notifications/
///         └── GET /stream            # SSE, recipient-filtered
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Current-user route (requires JWT authentication)
    let me_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/status", put(routes::tasks::update_status))
        .route("/:id/accept", post(routes::tasks::accept_task))
        .route("/:id/assignee", put(routes::tasks::assign_task))
        .route("/:id/comments", post(routes::tasks::add_comment))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // User management routes (require JWT authentication)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/", post(routes::users::create_user))
        .route("/:id/role", put(routes::users::change_role))
        .route("/:id", delete(routes::users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Real-time notification stream (requires JWT authentication)
    let notification_routes = Router::new()
        .route("/stream", get(routes::notifications::stream_notifications))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes.merge(me_routes))
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .nest("/notifications", notification_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer token, then re-reads the user from the registry so
/// role changes and deletions take effect immediately, and injects an
/// `AuthContext` into the request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // The subject may have been deleted since the token was issued
    let user = state
        .registry
        .get(claims.sub)
        .await?
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Unknown user".to_string()))?;

    let auth_context = AuthContext::from_user(&user);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
