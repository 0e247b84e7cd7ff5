//! Match log service: create/overwrite and delete a user's logs.

use std::sync::Arc;

use chrono::Utc;

use super::RateLimiter;
use crate::domain::match_log::{WatchedOn, review_text};
use crate::domain::{LogId, MatchId, MatchLog, NewMatchLog, Rating, UserId};
use crate::error::TouchlineError;
use crate::persistence::{RateLimitedAction, SocialStore};

/// Unvalidated log fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogDraft {
    /// Rating in stars.
    pub rating: Option<f64>,
    /// Review text.
    pub review: Option<String>,
    /// Watched date as `YYYY-MM-DD`.
    pub watched_on: Option<String>,
    /// Rewatch flag.
    pub is_rewatch: bool,
    /// Spoiler flag.
    pub has_spoilers: bool,
}

/// Writes match logs on behalf of their authors.
#[derive(Debug, Clone)]
pub struct LogService {
    store: Arc<dyn SocialStore>,
    limiter: RateLimiter,
}

impl LogService {
    /// Creates a new `LogService`.
    #[must_use]
    pub fn new(store: Arc<dyn SocialStore>, limiter: RateLimiter) -> Self {
        Self { store, limiter }
    }

    /// Logs `match_id` for `actor`, overwriting any earlier log of the same
    /// match.
    ///
    /// # Errors
    ///
    /// - [`TouchlineError::InvalidRequest`] for a bad rating or date.
    /// - [`TouchlineError::RateLimited`] past the log creation ceiling.
    /// - [`TouchlineError::NotFound`] if the match does not exist.
    /// - [`TouchlineError::PersistenceError`] on store failure.
    pub async fn create_log(
        &self,
        actor: UserId,
        match_id: MatchId,
        draft: LogDraft,
    ) -> Result<MatchLog, TouchlineError> {
        let rating = draft.rating.map(Rating::new).transpose()?;
        let today = Utc::now().date_naive();
        let watched_on = draft
            .watched_on
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| WatchedOn::parse(raw, today))
            .transpose()?
            .map(WatchedOn::date);
        let review = review_text(draft.review.as_deref());

        self.limiter.check(RateLimitedAction::LogCreate, actor).await?;

        if !self.store.match_exists(match_id).await? {
            return Err(TouchlineError::NotFound("match".to_string()));
        }

        let new = NewMatchLog {
            user_id: actor,
            match_id,
            rating,
            review,
            watched_on,
            is_rewatch: draft.is_rewatch,
            has_spoilers: draft.has_spoilers,
        };
        let log = self.store.upsert_log(LogId::new(), &new).await?;
        tracing::info!(
            log = %log.id,
            user = %actor,
            %match_id,
            rating = ?log.rating,
            "match logged"
        );
        Ok(log)
    }

    /// Deletes one of `actor`'s own logs.
    ///
    /// # Errors
    ///
    /// Returns [`TouchlineError::NotFound`] if the log does not exist or
    /// belongs to someone else, or a [`TouchlineError::PersistenceError`]
    /// on store failure.
    pub async fn delete_log(&self, actor: UserId, log_id: LogId) -> Result<(), TouchlineError> {
        if !self.store.delete_log(log_id, actor).await? {
            return Err(TouchlineError::NotFound("log".to_string()));
        }
        tracing::info!(log = %log_id, user = %actor, "match log deleted");
        Ok(())
    }
}
