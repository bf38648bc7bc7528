/// Notification dispatcher
///
/// Fan-out of lifecycle events to interested listeners. Delivery is
/// best-effort and at-most-once per connected subscriber: a lagging or
/// disconnected subscriber simply loses events, and nothing is persisted
/// or replayed.
///
/// Subscriptions are keyed by recipient, so a subscriber only ever
/// receives events addressed to them. The server filters; clients never
/// see other users' task data.
///
/// Publishing never blocks the action that triggered it.
///
/// # Example
///
/// ```
/// use tasktrack_shared::events::{NotificationDispatcher, TaskEvent, TaskEventKind};
/// use uuid::Uuid;
///
/// let dispatcher = NotificationDispatcher::new();
/// let user_id = Uuid::new_v4();
///
/// let mut rx = dispatcher.subscribe(user_id);
/// dispatcher.publish(TaskEvent::new(
///     TaskEventKind::Assigned,
///     Uuid::new_v4(),
///     user_id,
///     serde_json::json!({"title": "Fix bug"}),
/// ));
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.kind, TaskEventKind::Assigned);
/// ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Per-recipient channel capacity
///
/// Old events are dropped for subscribers that fall this far behind.
const CHANNEL_CAPACITY: usize = 64;

/// Notification event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    /// A task was assigned (or reassigned) to the recipient
    Assigned,

    /// A task the recipient cares about changed status
    StatusChanged,

    /// A comment was added to one of the recipient's tasks
    CommentAdded,

    /// A task created by the recipient is due soon
    DueSoon,
}

impl TaskEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskEventKind::Assigned => "assigned",
            TaskEventKind::StatusChanged => "status_changed",
            TaskEventKind::CommentAdded => "comment_added",
            TaskEventKind::DueSoon => "due_soon",
        }
    }
}

/// A typed notification addressed to a single recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// What happened
    pub kind: TaskEventKind,

    /// The task this event concerns
    pub task_id: Uuid,

    /// The user this event is addressed to
    pub recipient: Uuid,

    /// Event-specific payload
    pub payload: JsonValue,
}

impl TaskEvent {
    /// Creates a new event
    pub fn new(kind: TaskEventKind, task_id: Uuid, recipient: Uuid, payload: JsonValue) -> Self {
        TaskEvent {
            kind,
            task_id,
            recipient,
            payload,
        }
    }
}

/// Recipient-keyed event fan-out
///
/// Cheap to clone; all clones share the same subscriber table.
#[derive(Debug, Clone, Default)]
pub struct NotificationDispatcher {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<TaskEvent>>>>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to events addressed to the given user
    ///
    /// Multiple subscriptions per user are allowed (several browser tabs);
    /// each receiver sees every event addressed to that user from the
    /// moment it subscribed.
    pub fn subscribe(&self, recipient: Uuid) -> broadcast::Receiver<TaskEvent> {
        let mut channels = match self.channels.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        channels
            .entry(recipient)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publishes an event to the recipient's subscribers, if any
    ///
    /// Fire-and-forget: returns immediately, and an absent or lagging
    /// recipient is not an error.
    pub fn publish(&self, event: TaskEvent) {
        let channels = match self.channels.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(sender) = channels.get(&event.recipient) {
            // Err means no live receivers; the event is simply dropped
            if sender.send(event.clone()).is_err() {
                tracing::debug!(
                    recipient = %event.recipient,
                    kind = event.kind.as_str(),
                    "No live subscribers for event"
                );
            }
        }
    }

    /// Number of users with at least one channel allocated
    pub fn subscriber_count(&self) -> usize {
        match self.channels.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_for(recipient: Uuid, kind: TaskEventKind) -> TaskEvent {
        TaskEvent::new(kind, Uuid::new_v4(), recipient, json!({}))
    }

    #[tokio::test]
    async fn test_subscriber_receives_own_events() {
        let dispatcher = NotificationDispatcher::new();
        let user = Uuid::new_v4();

        let mut rx = dispatcher.subscribe(user);
        dispatcher.publish(event_for(user, TaskEventKind::Assigned));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, TaskEventKind::Assigned);
        assert_eq!(event.recipient, user);
    }

    #[tokio::test]
    async fn test_events_are_filtered_by_recipient() {
        let dispatcher = NotificationDispatcher::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut alice_rx = dispatcher.subscribe(alice);
        let mut bob_rx = dispatcher.subscribe(bob);

        dispatcher.publish(event_for(alice, TaskEventKind::StatusChanged));

        assert!(alice_rx.try_recv().is_ok());
        assert!(bob_rx.try_recv().is_err(), "Bob must not see Alice's events");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let dispatcher = NotificationDispatcher::new();

        // Neither of these may panic or block
        dispatcher.publish(event_for(Uuid::new_v4(), TaskEventKind::CommentAdded));

        let user = Uuid::new_v4();
        let rx = dispatcher.subscribe(user);
        drop(rx);
        dispatcher.publish(event_for(user, TaskEventKind::CommentAdded));
    }

    #[tokio::test]
    async fn test_multiple_subscriptions_per_user() {
        let dispatcher = NotificationDispatcher::new();
        let user = Uuid::new_v4();

        let mut rx1 = dispatcher.subscribe(user);
        let mut rx2 = dispatcher.subscribe(user);

        dispatcher.publish(event_for(user, TaskEventKind::DueSoon));

        assert_eq!(rx1.recv().await.unwrap().kind, TaskEventKind::DueSoon);
        assert_eq!(rx2.recv().await.unwrap().kind, TaskEventKind::DueSoon);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let dispatcher = NotificationDispatcher::new();
        let user = Uuid::new_v4();

        // Channel exists but with no receiver at publish time
        let rx = dispatcher.subscribe(user);
        drop(rx);
        dispatcher.publish(event_for(user, TaskEventKind::Assigned));

        // No replay for late subscribers
        let mut rx = dispatcher.subscribe(user);
        assert!(rx.try_recv().is_err());
    }
}
