//! Engagement engine: likes, comments and follows.
//!
//! Every write follows the same order: validate and rate-limit, apply the
//! primary statement, then enqueue the notification. The notification step
//! is best-effort and can never undo or fail the primary write.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::engagement::comment_body;
use crate::domain::{Comment, CommentId, LikeToggle, LogId, NotificationKind, UserId};
use crate::error::TouchlineError;
use crate::persistence::{RateLimitedAction, SocialStore};

use super::{NotificationService, RateLimiter};

/// An account that cannot be unfollowed while the policy is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedAccount {
    username: String,
}

impl PinnedAccount {
    /// Pins the account with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Reads the policy from configuration. `None` when disabled or when no
    /// username is configured.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        if !config.pinned_account_enabled {
            return None;
        }
        config.pinned_account_username.as_deref().map(Self::new)
    }

    /// Returns `true` if `username` is the pinned account.
    #[must_use]
    pub fn is_pinned(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username)
    }
}

/// Orchestrates likes, comments and follows.
#[derive(Debug, Clone)]
pub struct EngagementService {
    store: Arc<dyn SocialStore>,
    limiter: RateLimiter,
    notifications: NotificationService,
    pinned: Option<PinnedAccount>,
}

impl EngagementService {
    /// Creates a new `EngagementService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn SocialStore>,
        limiter: RateLimiter,
        notifications: NotificationService,
        pinned: Option<PinnedAccount>,
    ) -> Self {
        Self {
            store,
            limiter,
            notifications,
            pinned,
        }
    }

    /// Likes the log if `actor` has not liked it yet, otherwise removes the
    /// like.
    ///
    /// # Errors
    ///
    /// - [`TouchlineError::RateLimited`] past the like ceiling.
    /// - [`TouchlineError::NotFound`] if the log does not exist.
    /// - [`TouchlineError::PersistenceError`] on store failure.
    pub async fn toggle_like(
        &self,
        actor: UserId,
        log_id: LogId,
    ) -> Result<LikeToggle, TouchlineError> {
        self.limiter.check(RateLimitedAction::Like, actor).await?;

        let owner = self
            .store
            .log_owner(log_id)
            .await?
            .ok_or_else(|| TouchlineError::NotFound("log".to_string()))?;

        if self.store.like_exists(actor, log_id).await? {
            self.store.delete_like(actor, log_id).await?;
            tracing::info!(log = %log_id, user = %actor, "log unliked");
            return Ok(LikeToggle::Unliked);
        }

        // A concurrent toggle may have inserted first; that still counts as liked.
        let inserted = self.store.insert_like(actor, log_id).await?;
        tracing::info!(log = %log_id, user = %actor, inserted, "log liked");

        if inserted {
            self.notifications
                .enqueue(owner, actor, NotificationKind::LogLike, Some(log_id), None)
                .await;
        }
        Ok(LikeToggle::Liked)
    }

    /// Adds a comment to a log.
    ///
    /// The body is trimmed and silently cut to 500 characters.
    ///
    /// # Errors
    ///
    /// - [`TouchlineError::InvalidRequest`] for an empty body.
    /// - [`TouchlineError::NotFound`] if the log does not exist.
    /// - [`TouchlineError::PersistenceError`] on store failure.
    pub async fn create_comment(
        &self,
        actor: UserId,
        log_id: LogId,
        body: &str,
    ) -> Result<Comment, TouchlineError> {
        let body = comment_body(body)?;

        let owner = self
            .store
            .log_owner(log_id)
            .await?
            .ok_or_else(|| TouchlineError::NotFound("log".to_string()))?;

        let comment = self
            .store
            .insert_comment(CommentId::new(), log_id, actor, &body)
            .await?;
        tracing::info!(comment = %comment.id, log = %log_id, user = %actor, "comment added");

        self.notifications
            .enqueue(
                owner,
                actor,
                NotificationKind::Comment,
                Some(log_id),
                Some(comment.id),
            )
            .await;
        Ok(comment)
    }

    /// Comments on a log, oldest first. Empty on store failure.
    pub async fn list_comments(&self, log_id: LogId) -> Vec<Comment> {
        self.store
            .comments_for_log(log_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(log = %log_id, error = %e, "failed to load comments");
                Vec::new()
            })
    }

    /// Follows `target`. Following someone twice is a no-op.
    ///
    /// # Errors
    ///
    /// - [`TouchlineError::InvalidRequest`] when following yourself.
    /// - [`TouchlineError::NotFound`] if the target does not exist.
    /// - [`TouchlineError::PersistenceError`] on store failure.
    pub async fn follow(&self, actor: UserId, target: UserId) -> Result<(), TouchlineError> {
        if actor == target {
            return Err(TouchlineError::InvalidRequest(
                "you cannot follow yourself".to_string(),
            ));
        }
        if self.store.profile_by_id(target).await?.is_none() {
            return Err(TouchlineError::NotFound("user".to_string()));
        }

        let inserted = self.store.insert_follow(actor, target).await?;
        if inserted {
            tracing::info!(follower = %actor, following = %target, "user followed");
            self.notifications
                .enqueue(target, actor, NotificationKind::Follow, None, None)
                .await;
        }
        Ok(())
    }

    /// Unfollows `target`.
    ///
    /// # Errors
    ///
    /// - [`TouchlineError::InvalidRequest`] when unfollowing yourself.
    /// - [`TouchlineError::NotFound`] if the target does not exist.
    /// - [`TouchlineError::Forbidden`] if the target is the pinned account.
    /// - [`TouchlineError::PersistenceError`] on store failure.
    pub async fn unfollow(&self, actor: UserId, target: UserId) -> Result<(), TouchlineError> {
        if actor == target {
            return Err(TouchlineError::InvalidRequest(
                "you cannot unfollow yourself".to_string(),
            ));
        }
        let profile = self
            .store
            .profile_by_id(target)
            .await?
            .ok_or_else(|| TouchlineError::NotFound("user".to_string()))?;

        if self
            .pinned
            .as_ref()
            .is_some_and(|p| p.is_pinned(&profile.username))
        {
            return Err(TouchlineError::Forbidden(format!(
                "@{} can't be unfollowed",
                profile.username
            )));
        }

        let removed = self.store.delete_follow(actor, target).await?;
        tracing::info!(follower = %actor, following = %target, removed, "user unfollowed");
        Ok(())
    }
}
