//! Notification center: best-effort fan-out, listing and read state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    CommentId, EventBus, LogId, NewNotification, Notification, NotificationEvent, NotificationId,
    NotificationKind, UserId,
};
use crate::error::TouchlineError;
use crate::persistence::SocialStore;

/// Default page size for notification listings.
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 20;

/// Largest page a caller may request.
pub const MAX_NOTIFICATION_LIMIT: u32 = 50;

/// Page size actually served for a requested `limit`.
#[must_use]
pub fn page_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
        .clamp(1, MAX_NOTIFICATION_LIMIT)
}

/// Stores, lists and marks notifications, and pushes new ones onto the
/// [`EventBus`].
///
/// Enqueueing never fails its caller: a like or comment succeeds even when
/// the notification insert does not.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn SocialStore>,
    event_bus: EventBus,
}

impl NotificationService {
    /// Creates a new `NotificationService`.
    #[must_use]
    pub fn new(store: Arc<dyn SocialStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Records that `actor` did something to `recipient`'s content.
    ///
    /// Self-actions are skipped. Store failures are logged and swallowed.
    /// Returns the new notification's id when one was stored.
    pub async fn enqueue(
        &self,
        recipient: UserId,
        actor: UserId,
        kind: NotificationKind,
        log_id: Option<LogId>,
        comment_id: Option<CommentId>,
    ) -> Option<NotificationId> {
        if recipient == actor {
            tracing::debug!(%actor, kind = kind.as_str(), "skipping self notification");
            return None;
        }

        let notification = NewNotification {
            id: NotificationId::new(),
            recipient,
            actor,
            kind,
            log_id,
            comment_id,
            created_at: Utc::now(),
        };

        match self.store.insert_notification(&notification).await {
            Ok(()) => {
                let delivered = self
                    .event_bus
                    .publish(NotificationEvent::from(&notification));
                tracing::debug!(
                    id = %notification.id,
                    %recipient,
                    kind = kind.as_str(),
                    delivered,
                    "notification stored"
                );
                Some(notification.id)
            }
            Err(e) => {
                tracing::warn!(
                    %recipient,
                    %actor,
                    kind = kind.as_str(),
                    error = %e,
                    "failed to store notification"
                );
                None
            }
        }
    }

    /// Lists the viewer's notifications strictly older than `before`,
    /// newest first. `limit` defaults to 20 and is capped at 50.
    ///
    /// Returns an empty list for anonymous viewers or on store failure.
    pub async fn list(
        &self,
        viewer: Option<UserId>,
        limit: Option<u32>,
        before: Option<DateTime<Utc>>,
    ) -> Vec<Notification> {
        let Some(viewer) = viewer else {
            return Vec::new();
        };
        self.store
            .notifications(viewer, page_limit(limit), before)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(%viewer, error = %e, "failed to list notifications");
                Vec::new()
            })
    }

    /// Number of the viewer's unread notifications; `0` on store failure.
    pub async fn unread_count(&self, viewer: UserId) -> i64 {
        self.store.unread_count(viewer).await.unwrap_or_else(|e| {
            tracing::warn!(%viewer, error = %e, "failed to count unread notifications");
            0
        })
    }

    /// Marks every unread notification of the viewer as read.
    ///
    /// # Errors
    ///
    /// Returns a [`TouchlineError::PersistenceError`] on store failure.
    pub async fn mark_all_read(&self, viewer: UserId) -> Result<u64, TouchlineError> {
        let updated = self.store.mark_all_read(viewer, Utc::now()).await?;
        tracing::debug!(%viewer, updated, "notifications marked read");
        Ok(updated)
    }

    /// Marks one of the viewer's notifications as read. Another user's
    /// notification is left untouched and reported as zero updates.
    ///
    /// # Errors
    ///
    /// Returns a [`TouchlineError::PersistenceError`] on store failure.
    pub async fn mark_one_read(
        &self,
        id: NotificationId,
        viewer: UserId,
    ) -> Result<u64, TouchlineError> {
        self.store.mark_read(id, viewer, Utc::now()).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::persistence::memory::tests::seed_profile;

    fn make_service(store: &Arc<MemoryStore>) -> NotificationService {
        NotificationService::new(
            Arc::clone(store) as Arc<dyn SocialStore>,
            EventBus::new(100),
        )
    }

    #[test]
    fn page_limit_defaults_and_caps() {
        assert_eq!(page_limit(None), 20);
        assert_eq!(page_limit(Some(0)), 1);
        assert_eq!(page_limit(Some(500)), 50);
    }

    #[tokio::test]
    async fn self_actions_are_not_notified() {
        let store = Arc::new(MemoryStore::new());
        let service = make_service(&store);
        let user = seed_profile(&store, "ana").await;

        let id = service
            .enqueue(user, user, NotificationKind::LogLike, Some(LogId::new()), None)
            .await;
        assert!(id.is_none());
        assert_eq!(store.notification_count(user).await, 0);
    }

    #[tokio::test]
    async fn enqueue_publishes_to_event_bus() {
        let store = Arc::new(MemoryStore::new());
        let service = make_service(&store);
        let mut rx = service.event_bus().subscribe();
        let owner = seed_profile(&store, "ana").await;
        let actor = seed_profile(&store, "ben").await;

        let Some(id) = service
            .enqueue(owner, actor, NotificationKind::Follow, None, None)
            .await
        else {
            panic!("notification not stored");
        };

        let Ok(NotificationEvent::NotificationCreated {
            notification_id,
            recipient,
            ..
        }) = rx.recv().await
        else {
            panic!("expected event");
        };
        assert_eq!(notification_id, id);
        assert_eq!(recipient, owner);
    }

    #[tokio::test]
    async fn list_is_empty_without_viewer() {
        let store = Arc::new(MemoryStore::new());
        let service = make_service(&store);
        let owner = seed_profile(&store, "ana").await;
        let actor = seed_profile(&store, "ben").await;
        let _ = service
            .enqueue(owner, actor, NotificationKind::Follow, None, None)
            .await;

        assert!(service.list(None, None, None).await.is_empty());
        assert_eq!(service.list(Some(owner), None, None).await.len(), 1);
    }

    #[tokio::test]
    async fn list_pages_with_cursor_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let service = make_service(&store);
        let owner = seed_profile(&store, "ana").await;
        let actor = seed_profile(&store, "ben").await;
        for _ in 0..3 {
            let _ = service
                .enqueue(owner, actor, NotificationKind::Comment, None, None)
                .await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let first = service.list(Some(owner), Some(2), None).await;
        assert_eq!(first.len(), 2);
        let Some(first_item) = first.first() else {
            panic!("empty page");
        };
        let Some(cursor) = first.last().map(|n| n.created_at) else {
            panic!("empty page");
        };
        assert!(first_item.created_at > cursor);
        assert_eq!(first_item.actor.username, "ben");

        let rest = service.list(Some(owner), Some(2), Some(cursor)).await;
        assert_eq!(rest.len(), 1);
        assert!(rest.iter().all(|n| n.created_at < cursor));
    }

    #[tokio::test]
    async fn marking_read_is_scoped_to_the_viewer() {
        let store = Arc::new(MemoryStore::new());
        let service = make_service(&store);
        let owner = seed_profile(&store, "ana").await;
        let actor = seed_profile(&store, "ben").await;

        let Some(id) = service
            .enqueue(owner, actor, NotificationKind::Follow, None, None)
            .await
        else {
            panic!("notification not stored");
        };
        let _ = service
            .enqueue(owner, actor, NotificationKind::Comment, None, None)
            .await;
        assert_eq!(service.unread_count(owner).await, 2);

        // The actor cannot mark the owner's notification.
        assert!(matches!(service.mark_one_read(id, actor).await, Ok(0)));
        assert!(matches!(service.mark_one_read(id, owner).await, Ok(1)));
        assert!(matches!(service.mark_one_read(id, owner).await, Ok(0)));
        assert_eq!(service.unread_count(owner).await, 1);

        assert!(matches!(service.mark_all_read(owner).await, Ok(1)));
        assert_eq!(service.unread_count(owner).await, 0);
        assert!(matches!(service.mark_all_read(owner).await, Ok(0)));
    }
}
