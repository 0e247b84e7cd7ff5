//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::{EventBus, SchemaCapabilities};
use crate::identity::IdentityProvider;
use crate::persistence::SocialStore;
use crate::service::{
    EngagementService, FeedService, LogService, NotificationService, PinnedAccount,
    ProfileService, RateLimiter,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Profile provisioning and lookup.
    pub profiles: Arc<ProfileService>,
    /// Match log writes.
    pub logs: Arc<LogService>,
    /// Likes, comments and follows.
    pub engagement: Arc<EngagementService>,
    /// Feed and match page reads.
    pub feed: Arc<FeedService>,
    /// Notification center.
    pub notifications: Arc<NotificationService>,
    /// Resolves the signed-in user of a request.
    pub identity: Arc<dyn IdentityProvider>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires every service around one store.
    #[must_use]
    pub fn new(
        store: Arc<dyn SocialStore>,
        config: &AppConfig,
        capabilities: SchemaCapabilities,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let limiter = RateLimiter::from_config(Arc::clone(&store), config);
        let notifications = NotificationService::new(Arc::clone(&store), event_bus.clone());

        Self {
            profiles: Arc::new(ProfileService::new(Arc::clone(&store))),
            logs: Arc::new(LogService::new(Arc::clone(&store), limiter.clone())),
            engagement: Arc::new(EngagementService::new(
                Arc::clone(&store),
                limiter,
                notifications.clone(),
                PinnedAccount::from_config(config),
            )),
            feed: Arc::new(FeedService::new(
                store,
                config.feed_page_size,
                capabilities,
            )),
            notifications: Arc::new(notifications),
            identity,
            event_bus,
        }
    }
}
