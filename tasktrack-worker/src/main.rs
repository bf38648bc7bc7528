//! # TaskTrack Worker
//!
//! Periodic due-date reminder sweeper. On a fixed cadence it scans for
//! tasks due within the lookahead window and requests a reminder for each
//! task's creator.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `SWEEP_INTERVAL_SECS`: Seconds between sweeps (default: 86400)
//! - `SWEEP_LOOKAHEAD_HOURS`: Due-date window in hours (default: 24)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktrack-worker
//! ```

use std::sync::Arc;
use tasktrack_shared::db::pool::{create_pool, DatabaseConfig};
use tasktrack_shared::store::postgres::PgStore;
use tasktrack_worker::mailer::LogMailer;
use tasktrack_worker::sweeper::{ReminderSweeper, SweeperConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasktrack_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskTrack Worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let config = SweeperConfig {
        interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 60 * 60),
        lookahead_hours: std::env::var("SWEEP_LOOKAHEAD_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24),
    };

    let pool = create_pool(DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await?;
    let store = Arc::new(PgStore::new(pool));

    let sweeper = ReminderSweeper::new(
        store.clone(),
        store,
        Arc::new(LogMailer::new()),
        config,
    );

    // Shut down cleanly on ctrl-c
    let shutdown_token = sweeper.shutdown_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received, exiting...");
        shutdown_token.cancel();
    });

    sweeper.run().await
}
