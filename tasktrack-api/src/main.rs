//! # TaskTrack API Server
//!
//! The HTTP server for TaskTrack: registration/login, role-gated task
//! lifecycle endpoints, user management, and the real-time notification
//! stream.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktrack-api
//! ```

use std::sync::Arc;
use tasktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktrack_shared::db::pool::{create_pool, DatabaseConfig};
use tasktrack_shared::events::NotificationDispatcher;
use tasktrack_shared::services::registry::RegistryService;
use tasktrack_shared::services::tasks::TaskService;
use tasktrack_shared::store::postgres::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasktrack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskTrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and store
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    let store = Arc::new(PgStore::new(pool));

    // Wire up services
    let dispatcher = NotificationDispatcher::new();
    let registry = RegistryService::new(store.clone(), config.bootstrap_email.clone());
    let tasks = TaskService::new(store, dispatcher.clone());

    // Build and serve the application
    let bind_address = config.bind_address();
    let state = AppState::new(registry, tasks, dispatcher, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
