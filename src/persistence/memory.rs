//! In-memory implementation of the persistence layer.
//!
//! [`MemoryStore`] mirrors the relational tables with plain collections
//! behind a single [`tokio::sync::RwLock`]. Aggregates (like and comment
//! counts) are computed on read exactly as the SQL implementation groups
//! them, so feed ordering behaves identically. The lock is held only for
//! the duration of one operation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{RateLimitedAction, SocialStore};
use crate::domain::match_log::match_title;
use crate::domain::{
    AuthorSummary, Comment, CommentId, FeedItem, FeedQuery, FeedSort, LogId, MatchId, MatchLog,
    MatchLogSort, MatchLogsQuery, MatchStatus, MatchSummary, NewMatchLog, NewNotification,
    NewProfile, Notification, NotificationId, Profile, ProfileInsert, ProfileStats, UserId,
};
use crate::error::TouchlineError;

/// A match as written by the fixtures ingestion process.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Match identifier.
    pub id: MatchId,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Competition name.
    pub competition: Option<String>,
    /// Home goals.
    pub home_score: Option<i32>,
    /// Away goals.
    pub away_score: Option<i32>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Kickoff time.
    pub kickoff_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: CommentId,
    log_id: LogId,
    author: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredNotification {
    new: NewNotification,
    read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    matches: HashMap<MatchId, MatchRecord>,
    logs: HashMap<LogId, MatchLog>,
    likes: HashMap<(UserId, LogId), DateTime<Utc>>,
    comments: Vec<StoredComment>,
    follows: HashSet<(UserId, UserId)>,
    notifications: Vec<StoredNotification>,
}

impl Tables {
    fn author(&self, id: UserId) -> Option<AuthorSummary> {
        self.profiles.get(&id).map(AuthorSummary::from)
    }

    fn like_count(&self, log: LogId) -> i64 {
        count_i64(self.likes.keys().filter(|(_, l)| *l == log).count())
    }

    fn comment_count(&self, log: LogId) -> i64 {
        count_i64(self.comments.iter().filter(|c| c.log_id == log).count())
    }

    fn follows(&self, follower: Option<UserId>, following: UserId) -> bool {
        follower.is_some_and(|f| self.follows.contains(&(f, following)))
    }

    /// Builds a feed item the way the SQL joins do: logs whose author or
    /// match row is missing drop out.
    fn feed_item(
        &self,
        log: &MatchLog,
        viewer: Option<UserId>,
        with_engagement: bool,
    ) -> Option<FeedItem> {
        let author = self.author(log.user_id)?;
        let fixture = self.matches.get(&log.match_id)?;
        let (like_count, comment_count, viewer_liked) = if with_engagement {
            (
                self.like_count(log.id),
                self.comment_count(log.id),
                viewer.is_some_and(|v| self.likes.contains_key(&(v, log.id))),
            )
        } else {
            (0, 0, false)
        };
        Some(FeedItem {
            log_id: log.id,
            author,
            match_summary: MatchSummary {
                match_id: fixture.id,
                title: match_title(&fixture.home_team, &fixture.away_team),
                competition: fixture.competition.clone(),
                home_score: fixture.home_score,
                away_score: fixture.away_score,
                status: fixture.status,
                kickoff_at: fixture.kickoff_at,
            },
            rating: log.rating,
            review: log.review.clone(),
            watched_on: log.watched_on,
            is_rewatch: log.is_rewatch,
            has_spoilers: log.has_spoilers,
            created_at: log.created_at,
            like_count,
            comment_count,
            viewer_liked,
        })
    }

    fn comment(&self, stored: &StoredComment) -> Option<Comment> {
        Some(Comment {
            id: stored.id,
            log_id: stored.log_id,
            author: self.author(stored.author)?,
            body: stored.body.clone(),
            created_at: stored.created_at,
        })
    }
}

fn count_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn newest_first(a: &FeedItem, b: &FeedItem) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.log_id.cmp(&a.log_id))
}

/// Process-local [`SocialStore`] for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a match, standing in for the ingestion process.
    pub async fn upsert_match(&self, record: MatchRecord) {
        let mut tables = self.tables.write().await;
        tables.matches.insert(record.id, record);
    }

    /// Number of stored notifications for `recipient`, read or not.
    pub async fn notification_count(&self, recipient: UserId) -> usize {
        let tables = self.tables.read().await;
        tables
            .notifications
            .iter()
            .filter(|n| n.new.recipient == recipient)
            .count()
    }

    /// Number of stored logs authored by `user`.
    pub async fn log_count(&self, user: UserId) -> usize {
        let tables = self.tables.read().await;
        tables.logs.values().filter(|l| l.user_id == user).count()
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn profile_by_id(&self, id: UserId) -> Result<Option<Profile>, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(&id).cloned())
    }

    async fn profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<ProfileInsert, TouchlineError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.id) {
            return Ok(ProfileInsert::AlreadyExists);
        }
        if tables
            .profiles
            .values()
            .any(|p| p.username.eq_ignore_ascii_case(&profile.username))
        {
            return Ok(ProfileInsert::UsernameTaken);
        }
        let created = Profile {
            id: profile.id,
            username: profile.username.clone(),
            display_name: profile.display_name.clone(),
            bio: None,
            avatar_url: profile.avatar_url.clone(),
            cover_url: None,
            website_url: None,
            x_handle: None,
            instagram_handle: None,
            created_at: Utc::now(),
        };
        tables.profiles.insert(created.id, created.clone());
        Ok(ProfileInsert::Created(created))
    }

    async fn profile_stats(&self, id: UserId) -> Result<ProfileStats, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(ProfileStats {
            followers: count_i64(tables.follows.iter().filter(|(_, b)| *b == id).count()),
            following: count_i64(tables.follows.iter().filter(|(a, _)| *a == id).count()),
            logs: count_i64(tables.logs.values().filter(|l| l.user_id == id).count()),
        })
    }

    async fn match_exists(&self, id: MatchId) -> Result<bool, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables.matches.contains_key(&id))
    }

    async fn upsert_log(&self, id: LogId, log: &NewMatchLog) -> Result<MatchLog, TouchlineError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let existing = tables
            .logs
            .values_mut()
            .find(|l| l.user_id == log.user_id && l.match_id == log.match_id);

        let stored = match existing {
            Some(row) => {
                row.rating = log.rating.map(|r| r.stars());
                row.review.clone_from(&log.review);
                row.watched_on = log.watched_on;
                row.is_rewatch = log.is_rewatch;
                row.has_spoilers = log.has_spoilers;
                row.updated_at = now;
                row.clone()
            }
            None => {
                let row = MatchLog {
                    id,
                    user_id: log.user_id,
                    match_id: log.match_id,
                    rating: log.rating.map(|r| r.stars()),
                    review: log.review.clone(),
                    watched_on: log.watched_on,
                    is_rewatch: log.is_rewatch,
                    has_spoilers: log.has_spoilers,
                    created_at: now,
                    updated_at: now,
                };
                tables.logs.insert(id, row.clone());
                row
            }
        };
        Ok(stored)
    }

    async fn log_owner(&self, id: LogId) -> Result<Option<UserId>, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables.logs.get(&id).map(|l| l.user_id))
    }

    async fn delete_log(&self, id: LogId, owner: UserId) -> Result<bool, TouchlineError> {
        let mut tables = self.tables.write().await;
        if !tables.logs.get(&id).is_some_and(|l| l.user_id == owner) {
            return Ok(false);
        }
        tables.logs.remove(&id);
        // ON DELETE CASCADE, including notifications about the log's comments
        let removed_comments: HashSet<CommentId> = tables
            .comments
            .iter()
            .filter(|c| c.log_id == id)
            .map(|c| c.id)
            .collect();
        tables.likes.retain(|(_, log), _| *log != id);
        tables.comments.retain(|c| c.log_id != id);
        tables.notifications.retain(|n| {
            n.new.log_id != Some(id)
                && !n.new.comment_id.is_some_and(|c| removed_comments.contains(&c))
        });
        Ok(true)
    }

    async fn count_recent(
        &self,
        action: RateLimitedAction,
        user: UserId,
        since: DateTime<Utc>,
    ) -> Result<i64, TouchlineError> {
        let tables = self.tables.read().await;
        let count = match action {
            RateLimitedAction::LogCreate => tables
                .logs
                .values()
                .filter(|l| l.user_id == user && l.updated_at >= since)
                .count(),
            RateLimitedAction::Like => tables
                .likes
                .iter()
                .filter(|((u, _), at)| *u == user && **at >= since)
                .count(),
        };
        Ok(count_i64(count))
    }

    async fn like_exists(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables.likes.contains_key(&(user, log)))
    }

    async fn insert_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
        let mut tables = self.tables.write().await;
        if tables.likes.contains_key(&(user, log)) {
            return Ok(false);
        }
        tables.likes.insert((user, log), Utc::now());
        Ok(true)
    }

    async fn delete_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
        let mut tables = self.tables.write().await;
        Ok(tables.likes.remove(&(user, log)).is_some())
    }

    async fn insert_comment(
        &self,
        id: CommentId,
        log: LogId,
        author: UserId,
        body: &str,
    ) -> Result<Comment, TouchlineError> {
        let mut tables = self.tables.write().await;
        if !tables.logs.contains_key(&log) {
            return Err(TouchlineError::PersistenceError(format!(
                "foreign key violation: log {log} does not exist"
            )));
        }
        let stored = StoredComment {
            id,
            log_id: log,
            author,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        let comment = tables.comment(&stored).ok_or_else(|| {
            TouchlineError::PersistenceError(format!(
                "foreign key violation: profile {author} does not exist"
            ))
        })?;
        tables.comments.push(stored);
        Ok(comment)
    }

    async fn comments_for_log(&self, log: LogId) -> Result<Vec<Comment>, TouchlineError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.log_id == log)
            .filter_map(|c| tables.comment(c))
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn insert_follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError> {
        let mut tables = self.tables.write().await;
        Ok(tables.follows.insert((follower, following)))
    }

    async fn delete_follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError> {
        let mut tables = self.tables.write().await;
        Ok(tables.follows.remove(&(follower, following)))
    }

    async fn is_following(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.contains(&(follower, following)))
    }

    async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>, TouchlineError> {
        let tables = self.tables.read().await;
        let mut items: Vec<FeedItem> = tables
            .logs
            .values()
            .filter(|l| !query.friends_only || tables.follows(query.viewer, l.user_id))
            .filter_map(|l| tables.feed_item(l, query.viewer, true))
            .collect();

        match query.sort {
            FeedSort::Newest => items.sort_by(newest_first),
            FeedSort::Trending => items.sort_by(|a, b| {
                b.comment_count
                    .cmp(&a.comment_count)
                    .then_with(|| newest_first(a, b))
            }),
        }

        Ok(items
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn logs_for_match(
        &self,
        query: &MatchLogsQuery,
    ) -> Result<Vec<FeedItem>, TouchlineError> {
        let tables = self.tables.read().await;
        let mut items: Vec<FeedItem> = tables
            .logs
            .values()
            .filter(|l| l.match_id == query.match_id)
            .filter(|l| !query.friends_only || tables.follows(query.viewer, l.user_id))
            .filter_map(|l| tables.feed_item(l, query.viewer, query.with_engagement))
            .collect();

        match query.sort {
            MatchLogSort::Likes => items.sort_by(|a, b| {
                b.like_count
                    .cmp(&a.like_count)
                    .then_with(|| newest_first(a, b))
            }),
            MatchLogSort::Recency => items.sort_by(newest_first),
        }
        items.truncate(query.limit as usize);
        Ok(items)
    }

    async fn match_ratings(&self, id: MatchId) -> Result<Vec<f64>, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .values()
            .filter(|l| l.match_id == id)
            .filter_map(|l| l.rating)
            .collect())
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<(), TouchlineError> {
        let mut tables = self.tables.write().await;
        tables.notifications.push(StoredNotification {
            new: notification.clone(),
            read_at: None,
        });
        Ok(())
    }

    async fn notifications(
        &self,
        recipient: UserId,
        limit: u32,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Notification>, TouchlineError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.new.recipient == recipient)
            .filter(|n| before.is_none_or(|cursor| n.new.created_at < cursor))
            .filter_map(|n| {
                Some(Notification {
                    id: n.new.id,
                    kind: n.new.kind,
                    actor: tables.author(n.new.actor)?,
                    log_id: n.new.log_id,
                    comment_id: n.new.comment_id,
                    created_at: n.new.created_at,
                    read_at: n.read_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn unread_count(&self, recipient: UserId) -> Result<i64, TouchlineError> {
        let tables = self.tables.read().await;
        Ok(count_i64(
            tables
                .notifications
                .iter()
                .filter(|n| n.new.recipient == recipient && n.read_at.is_none())
                .count(),
        ))
    }

    async fn mark_all_read(
        &self,
        recipient: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, TouchlineError> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.new.recipient == recipient && n.read_at.is_none())
        {
            n.read_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, TouchlineError> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.new.id == id && n.new.recipient == recipient && n.read_at.is_none())
        {
            n.read_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::NotificationKind;

    /// Seeds a finished match with the given id.
    pub(crate) async fn seed_match(store: &MemoryStore, id: i64) -> MatchId {
        let match_id = MatchId::new(id);
        store
            .upsert_match(MatchRecord {
                id: match_id,
                home_team: "Arsenal".to_string(),
                away_team: "Chelsea".to_string(),
                competition: Some("Premier League".to_string()),
                home_score: Some(2),
                away_score: Some(1),
                status: MatchStatus::Finished,
                kickoff_at: Utc::now(),
            })
            .await;
        match_id
    }

    /// Seeds a profile with the given username.
    pub(crate) async fn seed_profile(store: &MemoryStore, username: &str) -> UserId {
        let id = UserId::new();
        let inserted = store
            .insert_profile(&NewProfile {
                id,
                username: username.to_string(),
                display_name: None,
                avatar_url: None,
            })
            .await;
        let Ok(ProfileInsert::Created(_)) = inserted else {
            panic!("profile {username} not created");
        };
        id
    }

    /// Wraps a [`MemoryStore`] and fails the named operations with a
    /// [`TouchlineError::PersistenceError`].
    #[derive(Debug, Default)]
    pub(crate) struct FailingStore {
        pub(crate) inner: MemoryStore,
        failing: HashSet<&'static str>,
    }

    impl FailingStore {
        pub(crate) fn failing(ops: &[&'static str]) -> Self {
            Self {
                inner: MemoryStore::new(),
                failing: ops.iter().copied().collect(),
            }
        }

        fn check(&self, op: &'static str) -> Result<(), TouchlineError> {
            if self.failing.contains(op) {
                return Err(TouchlineError::PersistenceError(format!(
                    "{op}: connection reset"
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SocialStore for FailingStore {
        async fn profile_by_id(&self, id: UserId) -> Result<Option<Profile>, TouchlineError> {
            self.check("profile_by_id")?;
            self.inner.profile_by_id(id).await
        }

        async fn profile_by_username(
            &self,
            username: &str,
        ) -> Result<Option<Profile>, TouchlineError> {
            self.check("profile_by_username")?;
            self.inner.profile_by_username(username).await
        }

        async fn insert_profile(
            &self,
            profile: &NewProfile,
        ) -> Result<ProfileInsert, TouchlineError> {
            self.check("insert_profile")?;
            self.inner.insert_profile(profile).await
        }

        async fn profile_stats(&self, id: UserId) -> Result<ProfileStats, TouchlineError> {
            self.check("profile_stats")?;
            self.inner.profile_stats(id).await
        }

        async fn match_exists(&self, id: MatchId) -> Result<bool, TouchlineError> {
            self.check("match_exists")?;
            self.inner.match_exists(id).await
        }

        async fn upsert_log(
            &self,
            id: LogId,
            log: &NewMatchLog,
        ) -> Result<MatchLog, TouchlineError> {
            self.check("upsert_log")?;
            self.inner.upsert_log(id, log).await
        }

        async fn log_owner(&self, id: LogId) -> Result<Option<UserId>, TouchlineError> {
            self.check("log_owner")?;
            self.inner.log_owner(id).await
        }

        async fn delete_log(&self, id: LogId, owner: UserId) -> Result<bool, TouchlineError> {
            self.check("delete_log")?;
            self.inner.delete_log(id, owner).await
        }

        async fn count_recent(
            &self,
            action: RateLimitedAction,
            user: UserId,
            since: DateTime<Utc>,
        ) -> Result<i64, TouchlineError> {
            self.check("count_recent")?;
            self.inner.count_recent(action, user, since).await
        }

        async fn like_exists(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
            self.check("like_exists")?;
            self.inner.like_exists(user, log).await
        }

        async fn insert_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
            self.check("insert_like")?;
            self.inner.insert_like(user, log).await
        }

        async fn delete_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
            self.check("delete_like")?;
            self.inner.delete_like(user, log).await
        }

        async fn insert_comment(
            &self,
            id: CommentId,
            log: LogId,
            author: UserId,
            body: &str,
        ) -> Result<Comment, TouchlineError> {
            self.check("insert_comment")?;
            self.inner.insert_comment(id, log, author, body).await
        }

        async fn comments_for_log(&self, log: LogId) -> Result<Vec<Comment>, TouchlineError> {
            self.check("comments_for_log")?;
            self.inner.comments_for_log(log).await
        }

        async fn insert_follow(
            &self,
            follower: UserId,
            following: UserId,
        ) -> Result<bool, TouchlineError> {
            self.check("insert_follow")?;
            self.inner.insert_follow(follower, following).await
        }

        async fn delete_follow(
            &self,
            follower: UserId,
            following: UserId,
        ) -> Result<bool, TouchlineError> {
            self.check("delete_follow")?;
            self.inner.delete_follow(follower, following).await
        }

        async fn is_following(
            &self,
            follower: UserId,
            following: UserId,
        ) -> Result<bool, TouchlineError> {
            self.check("is_following")?;
            self.inner.is_following(follower, following).await
        }

        async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>, TouchlineError> {
            self.check("feed")?;
            self.inner.feed(query).await
        }

        async fn logs_for_match(
            &self,
            query: &MatchLogsQuery,
        ) -> Result<Vec<FeedItem>, TouchlineError> {
            self.check("logs_for_match")?;
            self.inner.logs_for_match(query).await
        }

        async fn match_ratings(&self, id: MatchId) -> Result<Vec<f64>, TouchlineError> {
            self.check("match_ratings")?;
            self.inner.match_ratings(id).await
        }

        async fn insert_notification(
            &self,
            notification: &NewNotification,
        ) -> Result<(), TouchlineError> {
            self.check("insert_notification")?;
            self.inner.insert_notification(notification).await
        }

        async fn notifications(
            &self,
            recipient: UserId,
            limit: u32,
            before: Option<DateTime<Utc>>,
        ) -> Result<Vec<Notification>, TouchlineError> {
            self.check("notifications")?;
            self.inner.notifications(recipient, limit, before).await
        }

        async fn unread_count(&self, recipient: UserId) -> Result<i64, TouchlineError> {
            self.check("unread_count")?;
            self.inner.unread_count(recipient).await
        }

        async fn mark_all_read(
            &self,
            recipient: UserId,
            at: DateTime<Utc>,
        ) -> Result<u64, TouchlineError> {
            self.check("mark_all_read")?;
            self.inner.mark_all_read(recipient, at).await
        }

        async fn mark_read(
            &self,
            id: NotificationId,
            recipient: UserId,
            at: DateTime<Utc>,
        ) -> Result<u64, TouchlineError> {
            self.check("mark_read")?;
            self.inner.mark_read(id, recipient, at).await
        }
    }

    #[tokio::test]
    async fn username_uniqueness_ignores_case() {
        let store = MemoryStore::new();
        seed_profile(&store, "KopEnd").await;

        let outcome = store
            .insert_profile(&NewProfile {
                id: UserId::new(),
                username: "kopend".to_string(),
                display_name: None,
                avatar_url: None,
            })
            .await;
        assert!(matches!(outcome, Ok(ProfileInsert::UsernameTaken)));
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_user_and_match() {
        let store = MemoryStore::new();
        let user = seed_profile(&store, "ana").await;
        let match_id = seed_match(&store, 42).await;
        let new = NewMatchLog {
            user_id: user,
            match_id,
            rating: None,
            review: None,
            watched_on: None,
            is_rewatch: false,
            has_spoilers: false,
        };

        let Ok(first) = store.upsert_log(LogId::new(), &new).await else {
            panic!("first upsert failed");
        };
        let Ok(second) = store.upsert_log(LogId::new(), &new).await else {
            panic!("second upsert failed");
        };
        assert_eq!(first.id, second.id);
        assert_eq!(store.log_count(user).await, 1);
    }

    #[tokio::test]
    async fn deleting_a_log_cascades_to_engagement() {
        let store = MemoryStore::new();
        let user = seed_profile(&store, "ana").await;
        let match_id = seed_match(&store, 7).await;
        let Ok(log) = store
            .upsert_log(
                LogId::new(),
                &NewMatchLog {
                    user_id: user,
                    match_id,
                    rating: None,
                    review: None,
                    watched_on: None,
                    is_rewatch: false,
                    has_spoilers: false,
                },
            )
            .await
        else {
            panic!("upsert failed");
        };
        let fan = seed_profile(&store, "ben").await;
        let _ = store.insert_like(fan, log.id).await;
        let Ok(comment) = store.insert_comment(CommentId::new(), log.id, fan, "hi").await else {
            panic!("comment insert failed");
        };
        let about = |kind, log_id, comment_id| NewNotification {
            id: NotificationId::new(),
            recipient: user,
            actor: fan,
            kind,
            log_id,
            comment_id,
            created_at: Utc::now(),
        };
        for n in [
            about(NotificationKind::LogLike, Some(log.id), None),
            about(NotificationKind::Comment, None, Some(comment.id)),
            about(NotificationKind::Follow, None, None),
        ] {
            let Ok(()) = store.insert_notification(&n).await else {
                panic!("notification insert failed");
            };
        }

        assert!(matches!(store.delete_log(log.id, UserId::new()).await, Ok(false)));
        assert!(matches!(store.delete_log(log.id, user).await, Ok(true)));
        assert!(matches!(store.like_exists(fan, log.id).await, Ok(false)));
        // only the follow notification survives
        assert_eq!(store.notification_count(user).await, 1);
        let Ok(comments) = store.comments_for_log(log.id).await else {
            panic!("comment read failed");
        };
        assert!(comments.is_empty());
    }
}
