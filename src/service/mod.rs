//! Service layer: business logic orchestration.
//!
//! Services validate input, apply the rate limiter, issue the primary write
//! through the [`crate::persistence::SocialStore`] and then fan out
//! best-effort notifications through [`NotificationService`], which also
//! feeds the [`super::domain::EventBus`].

pub mod engagement_service;
pub mod feed_service;
pub mod log_service;
pub mod notification_service;
pub mod profile_service;
pub mod rate_limiter;

pub use engagement_service::{EngagementService, PinnedAccount};
pub use feed_service::FeedService;
pub use log_service::{LogDraft, LogService};
pub use notification_service::NotificationService;
pub use profile_service::{ProfileService, ProfileView};
pub use rate_limiter::{RateLimiter, RatePolicy};
