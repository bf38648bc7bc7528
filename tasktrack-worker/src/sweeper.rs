/// Reminder sweeper
///
/// This module implements the periodic due-date sweep. On a fixed cadence
/// it queries for tasks whose due date falls within the lookahead window
/// and asks the mailer to notify each task's creator.
///
/// The sweep is a polling scan, not a state-machine side effect: it never
/// deduplicates across runs (a task still due tomorrow is reminded again
/// on the next sweep), and a creator that no longer exists is skipped.
///
/// # Example
///
/// ```no_run
/// use tasktrack_worker::mailer::LogMailer;
/// use tasktrack_worker::sweeper::{ReminderSweeper, SweeperConfig};
/// use tasktrack_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let sweeper = ReminderSweeper::new(
///     store.clone(),
///     store,
///     Arc::new(LogMailer::new()),
///     SweeperConfig::default(),
/// );
///
/// sweeper.run().await?;
/// # Ok(())
/// # }
/// ```

use crate::mailer::Mailer;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tasktrack_shared::store::{TaskStore, UserStore};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Seconds between sweeps (default: daily)
    pub interval_secs: u64,

    /// How far ahead to look for due tasks, in hours (default: 24)
    pub lookahead_hours: i64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        SweeperConfig {
            interval_secs: 24 * 60 * 60,
            lookahead_hours: 24,
        }
    }
}

/// Periodic due-date reminder sweeper
pub struct ReminderSweeper {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    config: SweeperConfig,
    shutdown_token: CancellationToken,
}

impl ReminderSweeper {
    /// Creates a sweeper
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        config: SweeperConfig,
    ) -> Self {
        ReminderSweeper {
            tasks,
            users,
            mailer,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Gets shutdown token
    ///
    /// Used to signal graceful shutdown from external handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the sweep loop until shutdown
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            lookahead_hours = self.config.lookahead_hours,
            mailer = self.mailer.name(),
            "Reminder sweeper starting"
        );

        loop {
            if let Err(e) = self.sweep_once().await {
                // A failed sweep is retried on the next tick
                tracing::error!(error = %e, "Sweep failed");
            }

            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Reminder sweeper shut down");
                    break;
                }
                _ = sleep(Duration::from_secs(self.config.interval_secs)) => {}
            }
        }

        Ok(())
    }

    /// Performs a single sweep and returns the number of reminders sent
    pub async fn sweep_once(&self) -> anyhow::Result<usize> {
        let deadline = Utc::now() + ChronoDuration::hours(self.config.lookahead_hours);

        let due_tasks = self
            .tasks
            .list_due_before(deadline)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to query due tasks: {}", e))?;

        tracing::debug!(count = due_tasks.len(), "Found tasks due soon");

        let mut sent = 0;
        for task in due_tasks {
            // The creator may have been deleted; dangling references are
            // tolerated and simply skipped
            let creator = match self.users.find_by_id(task.created_by).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::warn!(
                        task_id = %task.id,
                        created_by = %task.created_by,
                        "Skipping reminder for task with missing creator"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::error!(task_id = %task.id, error = %e, "Failed to load creator");
                    continue;
                }
            };

            match self.mailer.send_reminder(&creator.email, &task.title).await {
                Ok(()) => {
                    tracing::info!(
                        task_id = %task.id,
                        recipient = %creator.email,
                        "Sent due-date reminder"
                    );
                    sent += 1;
                }
                Err(e) => {
                    tracing::error!(task_id = %task.id, error = %e, "Failed to send reminder");
                }
            }
        }

        Ok(sent)
    }
}
