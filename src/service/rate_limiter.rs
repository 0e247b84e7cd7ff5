//! Inline per-user rate limiting.
//!
//! Not a token bucket: before a limited write, the limiter counts the user's
//! rows for that action inside the trailing window and rejects the write
//! when the count has reached the ceiling. Two concurrent requests can both
//! pass the check before either commits; the ceiling is an abuse guard, not
//! an exact quota.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::AppConfig;
use crate::domain::UserId;
use crate::error::TouchlineError;
use crate::persistence::{RateLimitedAction, SocialStore};

/// Ceiling and window for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Maximum rows inside the window.
    pub limit: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RatePolicy {
    /// Returns `true` once `count` rows have used up the allowance.
    #[must_use]
    pub fn exhausted(&self, count: i64) -> bool {
        count >= i64::from(self.limit)
    }

    /// Start of the trailing window ending at `now`. A window reaching past
    /// the representable range starts at the earliest instant.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        i64::try_from(self.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Count-in-window limiter shared by the write services.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn SocialStore>,
    log_create: RatePolicy,
    like: RatePolicy,
}

impl RateLimiter {
    /// Creates a limiter with explicit policies.
    #[must_use]
    pub fn new(store: Arc<dyn SocialStore>, log_create: RatePolicy, like: RatePolicy) -> Self {
        Self {
            store,
            log_create,
            like,
        }
    }

    /// Creates a limiter from the configured limits.
    #[must_use]
    pub fn from_config(store: Arc<dyn SocialStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            RatePolicy {
                limit: config.log_rate_limit,
                window_secs: config.rate_limit_window_secs,
            },
            RatePolicy {
                limit: config.like_rate_limit,
                window_secs: config.rate_limit_window_secs,
            },
        )
    }

    /// Returns the policy for an action.
    #[must_use]
    pub const fn policy(&self, action: RateLimitedAction) -> RatePolicy {
        match action {
            RateLimitedAction::LogCreate => self.log_create,
            RateLimitedAction::Like => self.like,
        }
    }

    /// Rejects the write if `user` has exhausted the allowance for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`TouchlineError::RateLimited`] when over the limit, or a
    /// [`TouchlineError::PersistenceError`] if the count query fails.
    pub async fn check(&self, action: RateLimitedAction, user: UserId) -> Result<(), TouchlineError> {
        let policy = self.policy(action);
        let since = policy.window_start(Utc::now());

        let count = self.store.count_recent(action, user, since).await?;
        if policy.exhausted(count) {
            tracing::info!(
                %user,
                action = action.as_str(),
                count,
                limit = policy.limit,
                "rate limit exceeded"
            );
            return Err(TouchlineError::RateLimited {
                retry_after_secs: policy.window_secs,
            });
        }
        Ok(())
    }
}
