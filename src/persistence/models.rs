//! Typed database rows, one per query shape.
//!
//! Each row names exactly the columns its query selects and converts into
//! the matching domain type.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::domain::match_log::match_title;
use crate::domain::{
    AuthorSummary, Comment, CommentId, FeedItem, LogId, MatchId, MatchLog, MatchStatus,
    MatchSummary, Notification, NotificationId, NotificationKind, Profile, UserId,
};
use crate::error::TouchlineError;

/// A row from `profiles`.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    /// Profile id.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Bio.
    pub bio: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Cover URL.
    pub cover_url: Option<String>,
    /// Website.
    pub website_url: Option<String>,
    /// X handle.
    pub x_handle: Option<String>,
    /// Instagram handle.
    pub instagram_handle: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            display_name: r.display_name,
            bio: r.bio,
            avatar_url: r.avatar_url,
            cover_url: r.cover_url,
            website_url: r.website_url,
            x_handle: r.x_handle,
            instagram_handle: r.instagram_handle,
            created_at: r.created_at,
        }
    }
}

/// A row from `match_logs`.
#[derive(Debug, Clone, FromRow)]
pub struct MatchLogRow {
    /// Log id.
    pub id: LogId,
    /// Author.
    pub user_id: UserId,
    /// Match.
    pub match_id: MatchId,
    /// Rating in stars.
    pub rating: Option<f64>,
    /// Review.
    pub review: Option<String>,
    /// Watched date.
    pub watched_on: Option<NaiveDate>,
    /// Rewatch flag.
    pub is_rewatch: bool,
    /// Spoiler flag.
    pub has_spoilers: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last upsert time.
    pub updated_at: DateTime<Utc>,
}

impl From<MatchLogRow> for MatchLog {
    fn from(r: MatchLogRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            match_id: r.match_id,
            rating: r.rating,
            review: r.review,
            watched_on: r.watched_on,
            is_rewatch: r.is_rewatch,
            has_spoilers: r.has_spoilers,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A feed row: log, author, match and engagement aggregates.
#[derive(Debug, Clone, FromRow)]
pub struct FeedRow {
    /// Log id.
    pub log_id: LogId,
    /// Author id.
    pub author_id: UserId,
    /// Author username.
    pub username: String,
    /// Author display name.
    pub display_name: Option<String>,
    /// Author avatar.
    pub avatar_url: Option<String>,
    /// Match id.
    pub match_id: MatchId,
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
    /// Raw match status.
    pub status: String,
    /// Kickoff time.
    pub kickoff_at: DateTime<Utc>,
    /// Rating.
    pub rating: Option<f64>,
    /// Review.
    pub review: Option<String>,
    /// Watched date.
    pub watched_on: Option<NaiveDate>,
    /// Rewatch flag.
    pub is_rewatch: bool,
    /// Spoiler flag.
    pub has_spoilers: bool,
    /// Log creation time.
    pub created_at: DateTime<Utc>,
    /// Likes on the log.
    pub like_count: i64,
    /// Comments on the log.
    pub comment_count: i64,
    /// Viewer has liked the log.
    pub viewer_liked: bool,
}

impl From<FeedRow> for FeedItem {
    fn from(r: FeedRow) -> Self {
        let status = r.status.parse().unwrap_or_else(|_| {
            tracing::debug!(status = %r.status, match_id = %r.match_id, "unrecognised match status");
            MatchStatus::Scheduled
        });
        Self {
            log_id: r.log_id,
            author: AuthorSummary {
                id: r.author_id,
                username: r.username,
                display_name: r.display_name,
                avatar_url: r.avatar_url,
            },
            match_summary: MatchSummary {
                match_id: r.match_id,
                title: match_title(&r.home_team, &r.away_team),
                competition: r.competition,
                home_score: r.home_score,
                away_score: r.away_score,
                status,
                kickoff_at: r.kickoff_at,
            },
            rating: r.rating,
            review: r.review,
            watched_on: r.watched_on,
            is_rewatch: r.is_rewatch,
            has_spoilers: r.has_spoilers,
            created_at: r.created_at,
            like_count: r.like_count,
            comment_count: r.comment_count,
            viewer_liked: r.viewer_liked,
        }
    }
}

/// A comment joined with its author.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    /// Comment id.
    pub id: CommentId,
    /// Log id.
    pub log_id: LogId,
    /// Author id.
    pub author_id: UserId,
    /// Author username.
    pub username: String,
    /// Author display name.
    pub display_name: Option<String>,
    /// Author avatar.
    pub avatar_url: Option<String>,
    /// Body.
    pub body: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Self {
            id: r.id,
            log_id: r.log_id,
            author: AuthorSummary {
                id: r.author_id,
                username: r.username,
                display_name: r.display_name,
                avatar_url: r.avatar_url,
            },
            body: r.body,
            created_at: r.created_at,
        }
    }
}

/// A notification joined with its actor.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    /// Notification id.
    pub id: NotificationId,
    /// Raw notification type.
    pub kind: String,
    /// Actor id.
    pub actor_id: UserId,
    /// Actor username.
    pub username: String,
    /// Actor display name.
    pub display_name: Option<String>,
    /// Actor avatar.
    pub avatar_url: Option<String>,
    /// Related log.
    pub log_id: Option<LogId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Read time.
    pub read_at: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = TouchlineError;

    fn try_from(r: NotificationRow) -> Result<Self, Self::Error> {
        let kind: NotificationKind = r.kind.parse()?;
        Ok(Self {
            id: r.id,
            kind,
            actor: AuthorSummary {
                id: r.actor_id,
                username: r.username,
                display_name: r.display_name,
                avatar_url: r.avatar_url,
            },
            log_id: r.log_id,
            comment_id: r.comment_id,
            created_at: r.created_at,
            read_at: r.read_at,
        })
    }
}
