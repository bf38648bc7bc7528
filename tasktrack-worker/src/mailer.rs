/// Reminder delivery contract
///
/// The sweeper talks to a `Mailer` rather than an SMTP client; actual
/// email transport lives outside this system. Two implementations ship
/// here: a tracing-backed mailer for deployments without a mail relay,
/// and a recording mock for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Mailer error types
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Delivery to the transport failed
    #[error("Failed to deliver reminder: {0}")]
    DeliveryFailed(String),
}

/// Mailer result type alias
pub type MailerResult<T> = Result<T, MailerError>;

/// Contract for sending due-date reminders
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Name for logging and diagnostics
    fn name(&self) -> &str;

    /// Requests a reminder be sent for a task
    async fn send_reminder(&self, recipient_email: &str, task_title: &str) -> MailerResult<()>;
}

/// Mailer that logs instead of sending
///
/// Default in environments without a mail relay configured.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_reminder(&self, recipient_email: &str, task_title: &str) -> MailerResult<()> {
        tracing::info!(
            recipient = recipient_email,
            task_title = task_title,
            "Reminder: task is due soon"
        );
        Ok(())
    }
}

/// Recording mailer for tests
///
/// Captures every `(recipient, title)` pair instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all reminders recorded so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("Mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send_reminder(&self, recipient_email: &str, task_title: &str) -> MailerResult<()> {
        self.sent
            .lock()
            .expect("Mailer mutex poisoned")
            .push((recipient_email.to_string(), task_title.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_mailer_records_sends() {
        let mailer = MockMailer::new();

        mailer
            .send_reminder("user@example.com", "Fix bug")
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "user@example.com");
        assert_eq!(sent[0].1, "Fix bug");
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer::new();
        assert!(mailer.send_reminder("user@example.com", "Fix bug").await.is_ok());
        assert_eq!(mailer.name(), "log");
    }
}
