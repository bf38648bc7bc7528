/// Common test utilities for integration tests
///
/// Provides a test context wired to the in-memory store with one user per
/// role, plus helpers for making authenticated JSON requests against the
/// router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tasktrack_api::app::{build_router, AppState};
use tasktrack_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tasktrack_shared::auth::jwt::{create_token, Claims, TokenType};
use tasktrack_shared::events::NotificationDispatcher;
use tasktrack_shared::models::user::{Role, User};
use tasktrack_shared::services::registry::RegistryService;
use tasktrack_shared::services::tasks::TaskService;
use tasktrack_shared::store::memory::MemoryStore;
use std::sync::Arc;
use tower::Service as _;

pub const BOOTSTRAP_EMAIL: &str = "admin@example.com";
pub const OWNER_PASSWORD: &str = "Own3rPassword";
pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the app and one user per role
pub struct TestContext {
    pub app: axum::Router,
    pub registry: RegistryService,
    pub dispatcher: NotificationDispatcher,
    pub owner: User,
    pub manager: User,
    pub employee: User,
    pub employee_password: String,
}

impl TestContext {
    /// Creates a context over a fresh in-memory store
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "unused-in-memory".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
            },
            bootstrap_email: BOOTSTRAP_EMAIL.to_string(),
        };

        let store = Arc::new(MemoryStore::new());
        let dispatcher = NotificationDispatcher::new();
        let registry = RegistryService::new(store.clone(), BOOTSTRAP_EMAIL);
        let tasks = TaskService::new(store, dispatcher.clone());

        // Seed one user per role
        let owner = registry
            .register(BOOTSTRAP_EMAIL, OWNER_PASSWORD, "Owner")
            .await?;

        let (manager, _) = registry
            .create_employee(
                Role::Owner,
                "manager@example.com",
                "Manager",
                Role::ProjectManager,
            )
            .await?;

        let (employee, employee_password) = registry
            .create_employee(
                Role::Owner,
                "employee@example.com",
                "Employee",
                Role::Employee,
            )
            .await?;

        let state = AppState::new(registry.clone(), tasks, dispatcher.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            app,
            registry,
            dispatcher,
            owner,
            manager,
            employee,
            employee_password,
        })
    }

    /// Returns a Bearer token for the given user
    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims::new(user.id, TokenType::Access);
        create_token(&claims, JWT_SECRET).expect("Token creation should succeed")
    }

    /// Makes a request and returns status plus parsed JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }
}
