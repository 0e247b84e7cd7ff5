//! Live fan-out of stored notifications.
//!
//! [`EventBus`] is a single [`tokio::sync::broadcast`] channel shared by
//! every connection. Each WebSocket connection holds an [`Inbox`], a
//! receiver that only yields events addressed to its own user.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::{NotificationEvent, UserId};

/// Broadcast bus for [`NotificationEvent`]s.
///
/// Capacity is configurable (default 10 000). A receiver that falls more
/// than `capacity` events behind loses the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<NotificationEvent>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events per
    /// receiver. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns how many connections saw it.
    ///
    /// With nobody connected the event is dropped; the notification row is
    /// still there for the next poll.
    pub fn publish(&self, event: NotificationEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Receiver for every event on the bus.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    /// Receiver for the events addressed to `user`.
    #[must_use]
    pub fn inbox(&self, user: UserId) -> Inbox {
        Inbox {
            user,
            rx: self.sender.subscribe(),
        }
    }

    /// Number of open receivers, i.e. live connections.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One user's view of the [`EventBus`].
#[derive(Debug)]
pub struct Inbox {
    user: UserId,
    rx: broadcast::Receiver<NotificationEvent>,
}

impl Inbox {
    /// The user this inbox belongs to.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Waits for the next event addressed to this user.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Lagged`] when events were dropped because the
    /// receiver fell behind (the inbox stays usable), or
    /// [`RecvError::Closed`] once the bus is gone.
    pub async fn recv(&mut self) -> Result<NotificationEvent, RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if event.recipient() == self.user {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{NotificationId, NotificationKind};
    use chrono::Utc;

    fn follow_of(recipient: UserId) -> NotificationEvent {
        NotificationEvent::NotificationCreated {
            notification_id: NotificationId::new(),
            recipient,
            actor: UserId::new(),
            kind: NotificationKind::Follow,
            log_id: None,
            comment_id: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn nobody_connected_drops_the_event() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(follow_of(UserId::new())), 0);
    }

    #[tokio::test]
    async fn inbox_skips_other_users_events() {
        let bus = EventBus::new(16);
        let ana = UserId::new();
        let mut inbox = bus.inbox(ana);

        bus.publish(follow_of(UserId::new()));
        bus.publish(follow_of(ana));

        let Ok(event) = inbox.recv().await else {
            panic!("expected ana's event");
        };
        assert_eq!(event.recipient(), ana);
        assert_eq!(inbox.user(), ana);
    }

    #[tokio::test]
    async fn lagging_inbox_reports_and_recovers() {
        let bus = EventBus::new(1);
        let ana = UserId::new();
        let mut inbox = bus.inbox(ana);

        bus.publish(follow_of(ana));
        bus.publish(follow_of(ana));

        assert!(matches!(inbox.recv().await, Err(RecvError::Lagged(1))));
        assert!(inbox.recv().await.is_ok());
    }

    #[test]
    fn each_inbox_is_a_receiver() {
        let bus = EventBus::new(16);
        let first = bus.inbox(UserId::new());
        let _second = bus.inbox(UserId::new());
        assert_eq!(bus.receiver_count(), 2);

        drop(first);
        assert_eq!(bus.receiver_count(), 1);
    }
}
