//! PostgreSQL implementation of the persistence layer.
//!
//! Queries are plain parameterized SQL. The only string composition is the
//! choice between fixed fragments (ordering, engagement aggregation), never
//! client input.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{CommentRow, FeedRow, MatchLogRow, NotificationRow, ProfileRow};
use super::{RateLimitedAction, SocialStore};
use crate::config::AppConfig;
use crate::domain::{
    Comment, CommentId, FeedItem, FeedQuery, FeedSort, LogId, MatchId, MatchLog, MatchLogSort,
    MatchLogsQuery, NewMatchLog, NewNotification, NewProfile, Notification, NotificationId,
    Profile, ProfileInsert, ProfileStats, SchemaCapabilities, UserId,
};
use crate::error::TouchlineError;

const PROFILE_COLUMNS: &str = "id, username, display_name, bio, avatar_url, cover_url, \
     website_url, x_handle, instagram_handle, created_at";

const LOG_COLUMNS: &str = "id, user_id, match_id, rating::float8 AS rating, review, watched_on, \
     is_rewatch, has_spoilers, created_at, updated_at";

const FEED_COLUMNS: &str = "l.id AS log_id, l.user_id AS author_id, p.username, p.display_name, \
     p.avatar_url, m.id AS match_id, home.name AS home_team, away.name AS away_team, \
     c.name AS competition, m.home_score, m.away_score, m.status, m.utc_date AS kickoff_at, \
     l.rating::float8 AS rating, l.review, l.watched_on, l.is_rewatch, l.has_spoilers, \
     l.created_at";

const FEED_SOURCES: &str = "FROM match_logs l \
     JOIN profiles p ON p.id = l.user_id \
     JOIN matches m ON m.id = l.match_id \
     JOIN teams home ON home.id = m.home_team_id \
     JOIN teams away ON away.id = m.away_team_id \
     LEFT JOIN competitions c ON c.id = m.competition_id";

const ENGAGEMENT_COLUMNS: &str = "COALESCE(lk.like_count, 0) AS like_count, \
     COALESCE(cm.comment_count, 0) AS comment_count, \
     EXISTS (SELECT 1 FROM log_likes v WHERE v.log_id = l.id AND v.user_id = $1) AS viewer_liked";

const ENGAGEMENT_JOINS: &str = "LEFT JOIN (SELECT log_id, COUNT(*) AS like_count FROM log_likes \
     GROUP BY log_id) lk ON lk.log_id = l.id \
     LEFT JOIN (SELECT log_id, COUNT(*) AS comment_count FROM log_comments \
     GROUP BY log_id) cm ON cm.log_id = l.id";

const REDUCED_ENGAGEMENT_COLUMNS: &str =
    "0::bigint AS like_count, 0::bigint AS comment_count, FALSE AS viewer_liked";

// $1 = viewer, $2 = friends only
const FRIENDS_FILTER: &str = "($2 = FALSE OR l.user_id IN \
     (SELECT f.following_id FROM follows f WHERE f.follower_id = $1))";

const COMMENT_COLUMNS: &str = "c.id, c.log_id, c.user_id AS author_id, p.username, \
     p.display_name, p.avatar_url, c.body, c.created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
///
/// The pool is leased per statement and never held across a multi-step
/// service operation.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool using the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`TouchlineError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(config: &AppConfig) -> Result<Self, TouchlineError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns a [`TouchlineError::PersistenceError`] if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), TouchlineError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TouchlineError::PersistenceError(e.to_string()))?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    /// Checks which optional tables the connected schema provides.
    ///
    /// # Errors
    ///
    /// Returns a [`TouchlineError::PersistenceError`] on database failure.
    pub async fn detect_capabilities(&self) -> Result<SchemaCapabilities, TouchlineError> {
        let engagement_tables = sqlx::query_scalar::<_, bool>(
            "SELECT to_regclass('public.log_likes') IS NOT NULL \
             AND to_regclass('public.log_comments') IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(SchemaCapabilities { engagement_tables })
    }
}

fn feed_order(sort: FeedSort) -> &'static str {
    match sort {
        FeedSort::Newest => "l.created_at DESC, l.id DESC",
        FeedSort::Trending => "comment_count DESC, l.created_at DESC, l.id DESC",
    }
}

fn match_log_order(sort: MatchLogSort) -> &'static str {
    match sort {
        MatchLogSort::Likes => "like_count DESC, l.created_at DESC, l.id DESC",
        MatchLogSort::Recency => "l.created_at DESC, l.id DESC",
    }
}

#[async_trait]
impl SocialStore for PostgresStore {
    async fn profile_by_id(&self, id: UserId) -> Result<Option<Profile>, TouchlineError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, TouchlineError> {
        let sql =
            format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE lower(username) = lower($1)");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<ProfileInsert, TouchlineError> {
        let sql = format!(
            "INSERT INTO profiles (id, username, display_name, avatar_url) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING RETURNING {PROFILE_COLUMNS}"
        );
        let result = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(profile.id)
            .bind(&profile.username)
            .bind(&profile.display_name)
            .bind(&profile.avatar_url)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => Ok(ProfileInsert::Created(row.into())),
            Ok(None) => Ok(ProfileInsert::AlreadyExists),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(ProfileInsert::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn profile_stats(&self, id: UserId) -> Result<ProfileStats, TouchlineError> {
        let (followers, following, logs) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT \
               (SELECT COUNT(*) FROM follows WHERE following_id = $1), \
               (SELECT COUNT(*) FROM follows WHERE follower_id = $1), \
               (SELECT COUNT(*) FROM match_logs WHERE user_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(ProfileStats {
            followers,
            following,
            logs,
        })
    }

    async fn match_exists(&self, id: MatchId) -> Result<bool, TouchlineError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM matches WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn upsert_log(&self, id: LogId, log: &NewMatchLog) -> Result<MatchLog, TouchlineError> {
        let sql = format!(
            "INSERT INTO match_logs \
               (id, user_id, match_id, rating, review, watched_on, is_rewatch, has_spoilers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (user_id, match_id) DO UPDATE SET \
               rating = EXCLUDED.rating, \
               review = EXCLUDED.review, \
               watched_on = EXCLUDED.watched_on, \
               is_rewatch = EXCLUDED.is_rewatch, \
               has_spoilers = EXCLUDED.has_spoilers, \
               updated_at = now() \
             RETURNING {LOG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MatchLogRow>(&sql)
            .bind(id)
            .bind(log.user_id)
            .bind(log.match_id)
            .bind(log.rating.map(|r| r.stars()))
            .bind(&log.review)
            .bind(log.watched_on)
            .bind(log.is_rewatch)
            .bind(log.has_spoilers)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn log_owner(&self, id: LogId) -> Result<Option<UserId>, TouchlineError> {
        let owner = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM match_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    async fn delete_log(&self, id: LogId, owner: UserId) -> Result<bool, TouchlineError> {
        let result = sqlx::query("DELETE FROM match_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_recent(
        &self,
        action: RateLimitedAction,
        user: UserId,
        since: DateTime<Utc>,
    ) -> Result<i64, TouchlineError> {
        let sql = match action {
            RateLimitedAction::LogCreate => {
                "SELECT COUNT(*) FROM match_logs WHERE user_id = $1 AND updated_at >= $2"
            }
            RateLimitedAction::Like => {
                "SELECT COUNT(*) FROM log_likes WHERE user_id = $1 AND created_at >= $2"
            }
        };
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(user)
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn like_exists(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM log_likes WHERE user_id = $1 AND log_id = $2)",
        )
        .bind(user)
        .bind(log)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
        let result = sqlx::query(
            "INSERT INTO log_likes (user_id, log_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, log_id) DO NOTHING",
        )
        .bind(user)
        .bind(log)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&self, user: UserId, log: LogId) -> Result<bool, TouchlineError> {
        let result = sqlx::query("DELETE FROM log_likes WHERE user_id = $1 AND log_id = $2")
            .bind(user)
            .bind(log)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(
        &self,
        id: CommentId,
        log: LogId,
        author: UserId,
        body: &str,
    ) -> Result<Comment, TouchlineError> {
        let sql = format!(
            "WITH c AS ( \
               INSERT INTO log_comments (id, log_id, user_id, body) VALUES ($1, $2, $3, $4) \
               RETURNING id, log_id, user_id, body, created_at \
             ) \
             SELECT {COMMENT_COLUMNS} FROM c JOIN profiles p ON p.id = c.user_id"
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(log)
            .bind(author)
            .bind(body)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn comments_for_log(&self, log: LogId) -> Result<Vec<Comment>, TouchlineError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM log_comments c JOIN profiles p ON p.id = c.user_id \
             WHERE c.log_id = $1 ORDER BY c.created_at ASC, c.id ASC"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(log)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn insert_follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) \
             ON CONFLICT (follower_id, following_id) DO NOTHING",
        )
        .bind(follower)
        .bind(following)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower)
                .bind(following)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_following(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, TouchlineError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower)
        .bind(following)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>, TouchlineError> {
        let sql = format!(
            "SELECT {FEED_COLUMNS}, {ENGAGEMENT_COLUMNS} {FEED_SOURCES} {ENGAGEMENT_JOINS} \
             WHERE {FRIENDS_FILTER} ORDER BY {} LIMIT $3 OFFSET $4",
            feed_order(query.sort)
        );
        let rows = sqlx::query_as::<_, FeedRow>(&sql)
            .bind(query.viewer)
            .bind(query.friends_only)
            .bind(i64::from(query.limit))
            .bind(i64::from(query.offset))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FeedItem::from).collect())
    }

    async fn logs_for_match(
        &self,
        query: &MatchLogsQuery,
    ) -> Result<Vec<FeedItem>, TouchlineError> {
        let (engagement_columns, engagement_joins) = if query.with_engagement {
            (ENGAGEMENT_COLUMNS, ENGAGEMENT_JOINS)
        } else {
            (REDUCED_ENGAGEMENT_COLUMNS, "")
        };
        let sql = format!(
            "SELECT {FEED_COLUMNS}, {engagement_columns} {FEED_SOURCES} {engagement_joins} \
             WHERE l.match_id = $3 AND {FRIENDS_FILTER} ORDER BY {} LIMIT $4",
            match_log_order(query.sort)
        );
        let rows = sqlx::query_as::<_, FeedRow>(&sql)
            .bind(query.viewer)
            .bind(query.friends_only)
            .bind(query.match_id)
            .bind(i64::from(query.limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FeedItem::from).collect())
    }

    async fn match_ratings(&self, id: MatchId) -> Result<Vec<f64>, TouchlineError> {
        let ratings = sqlx::query_scalar::<_, f64>(
            "SELECT rating::float8 FROM match_logs WHERE match_id = $1 AND rating IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<(), TouchlineError> {
        sqlx::query(
            "INSERT INTO notifications \
               (id, recipient_id, actor_id, type, log_id, comment_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(notification.id)
        .bind(notification.recipient)
        .bind(notification.actor)
        .bind(notification.kind.as_str())
        .bind(notification.log_id)
        .bind(notification.comment_id)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn notifications(
        &self,
        recipient: UserId,
        limit: u32,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Notification>, TouchlineError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT n.id, n.type AS kind, n.actor_id, p.username, p.display_name, p.avatar_url, \
               n.log_id, n.comment_id, n.created_at, n.read_at \
             FROM notifications n JOIN profiles p ON p.id = n.actor_id \
             WHERE n.recipient_id = $1 AND ($2::timestamptz IS NULL OR n.created_at < $2) \
             ORDER BY n.created_at DESC, n.id DESC LIMIT $3",
        )
        .bind(recipient)
        .bind(before)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Notification::try_from(row)
                    .map_err(|e| tracing::warn!(%id, error = %e, "skipping notification row"))
                    .ok()
            })
            .collect())
    }

    async fn unread_count(&self, recipient: UserId) -> Result<i64, TouchlineError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_all_read(
        &self,
        recipient: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, TouchlineError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $2 WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(recipient)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, TouchlineError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $3 \
             WHERE id = $1 AND recipient_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(recipient)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trending_ranks_by_comments_then_recency() {
        assert!(feed_order(FeedSort::Trending).starts_with("comment_count DESC, l.created_at"));
        assert!(feed_order(FeedSort::Newest).starts_with("l.created_at DESC"));
    }

    #[test]
    fn match_logs_rank_by_likes_then_recency() {
        assert!(match_log_order(MatchLogSort::Likes).starts_with("like_count DESC, l.created_at"));
    }

    #[test]
    fn reduced_columns_cover_every_aggregate() {
        for column in ["like_count", "comment_count", "viewer_liked"] {
            assert!(ENGAGEMENT_COLUMNS.contains(column));
            assert!(REDUCED_ENGAGEMENT_COLUMNS.contains(column));
        }
    }
}
