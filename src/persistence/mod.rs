//! Persistence layer: the `SocialStore` gateway and its implementations.
//!
//! Every operation on [`SocialStore`] maps to one parameterized statement
//! (or a short fixed sequence) against the relational store. Nothing here
//! wraps several statements in a transaction: services issue the primary
//! write first and best-effort side effects afterwards.
//!
//! - [`postgres::PostgresStore`] runs against PostgreSQL via `sqlx::PgPool`.
//! - [`memory::MemoryStore`] keeps the same tables in process memory for
//!   local development and tests.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Comment, CommentId, FeedItem, FeedQuery, LogId, MatchId, MatchLog, MatchLogsQuery,
    NewMatchLog, NewNotification, NewProfile, Notification, NotificationId, Profile,
    ProfileInsert, ProfileStats, UserId,
};
use crate::error::TouchlineError;

pub use memory::{MatchRecord, MemoryStore};
pub use postgres::PostgresStore;

/// Write actions guarded by the inline rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitedAction {
    /// Creating or overwriting a match log.
    LogCreate,
    /// Liking a match log.
    Like,
}

impl RateLimitedAction {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogCreate => "log_create",
            Self::Like => "like",
        }
    }
}

/// Storage gateway used by every service.
///
/// All methods return [`TouchlineError::PersistenceError`] on store failure.
#[async_trait]
pub trait SocialStore: Send + Sync + fmt::Debug {
    // ── Profiles ────────────────────────────────────────────────────────

    /// Loads a profile by id.
    async fn profile_by_id(&self, id: UserId) -> Result<Option<Profile>, TouchlineError>;

    /// Loads a profile by username, ignoring case.
    async fn profile_by_username(&self, username: &str)
    -> Result<Option<Profile>, TouchlineError>;

    /// Inserts a profile unless its id or username is already taken.
    async fn insert_profile(&self, profile: &NewProfile) -> Result<ProfileInsert, TouchlineError>;

    /// Follower, following and log counts for a profile.
    async fn profile_stats(&self, id: UserId) -> Result<ProfileStats, TouchlineError>;

    // ── Matches and logs ────────────────────────────────────────────────

    /// Returns `true` if the match exists.
    async fn match_exists(&self, id: MatchId) -> Result<bool, TouchlineError>;

    /// Inserts a log, or overwrites every field of the author's existing log
    /// for the same match and refreshes `updated_at`.
    async fn upsert_log(&self, id: LogId, log: &NewMatchLog) -> Result<MatchLog, TouchlineError>;

    /// Returns the author of a log, or `None` if it does not exist.
    async fn log_owner(&self, id: LogId) -> Result<Option<UserId>, TouchlineError>;

    /// Deletes a log owned by `owner`. Returns `false` if nothing matched.
    async fn delete_log(&self, id: LogId, owner: UserId) -> Result<bool, TouchlineError>;

    /// Counts `user`'s rows for `action` at or after `since`.
    async fn count_recent(
        &self,
        action: RateLimitedAction,
        user: UserId,
        since: DateTime<Utc>,
    ) -> Result<i64, TouchlineError>;

    // ── Likes ───────────────────────────────────────────────────────────

    /// Returns `true` if `user` likes `log`.
    async fn like_exists(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError>;

    /// Inserts a like, ignoring a duplicate. Returns `true` if a row was added.
    async fn insert_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError>;

    /// Deletes a like. Returns `true` if a row was removed.
    async fn delete_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError>;

    // ── Comments ────────────────────────────────────────────────────────

    /// Inserts a comment and returns it joined with its author.
    async fn insert_comment(
        &self,
        id: CommentId,
        log: LogId,
        author: UserId,
        body: &str,
    ) -> Result<Comment, TouchlineError>;

    /// Comments on a log, oldest first.
    async fn comments_for_log(&self, log: LogId) -> Result<Vec<Comment>, TouchlineError>;

    // ── Follows ─────────────────────────────────────────────────────────

    /// Inserts a follow edge, ignoring a duplicate. Returns `true` if added.
    async fn insert_follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError>;

    /// Deletes a follow edge. Returns `true` if removed.
    async fn delete_follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError>;

    /// Returns `true` if `follower` follows `following`.
    async fn is_following(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError>;

    // ── Feed ────────────────────────────────────────────────────────────

    /// One page of the community feed.
    async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>, TouchlineError>;

    /// Logs for a single match.
    async fn logs_for_match(&self, query: &MatchLogsQuery)
    -> Result<Vec<FeedItem>, TouchlineError>;

    /// Every non-null rating of a match.
    async fn match_ratings(&self, id: MatchId) -> Result<Vec<f64>, TouchlineError>;

    // ── Notifications ───────────────────────────────────────────────────

    /// Stores a notification.
    async fn insert_notification(&self, notification: &NewNotification)
    -> Result<(), TouchlineError>;

    /// Recipient's notifications older than `before`, newest first.
    async fn notifications(
        &self,
        recipient: UserId,
        limit: u32,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Notification>, TouchlineError>;

    /// Number of unread notifications.
    async fn unread_count(&self, recipient: UserId) -> Result<i64, TouchlineError>;

    /// Marks all of the recipient's unread notifications read.
    async fn mark_all_read(
        &self,
        recipient: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, TouchlineError>;

    /// Marks one of the recipient's notifications read.
    async fn mark_read(
        &self,
        id: NotificationId,
        recipient: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, TouchlineError>;
}
