//! Notifications generated by engagement on another user's content.
//!
//! Every successful notification insert also publishes a
//! [`NotificationEvent`] through the [`super::EventBus`] so connected
//! WebSocket clients see it immediately.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthorSummary, CommentId, LogId, NotificationId, UserId};
use crate::error::TouchlineError;

/// Kind of activity a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone liked one of the recipient's match logs.
    LogLike,
    /// Someone commented on one of the recipient's match logs.
    Comment,
    /// Someone followed the recipient.
    Follow,
    /// Someone liked one of the recipient's posts outside match logs.
    PostLike,
}

impl NotificationKind {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogLike => "log_like",
            Self::Comment => "comment",
            Self::Follow => "follow",
            Self::PostLike => "post_like",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = TouchlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log_like" => Ok(Self::LogLike),
            "comment" => Ok(Self::Comment),
            "follow" => Ok(Self::Follow),
            "post_like" => Ok(Self::PostLike),
            other => Err(TouchlineError::Internal(format!(
                "unknown notification type: {other}"
            ))),
        }
    }
}

/// Input for a notification insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Pre-generated id.
    pub id: NotificationId,
    /// User being notified.
    pub recipient: UserId,
    /// User who acted.
    pub actor: UserId,
    /// Activity kind.
    pub kind: NotificationKind,
    /// Related log.
    pub log_id: Option<LogId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A notification joined with its actor's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Activity kind.
    pub kind: NotificationKind,
    /// Who acted.
    pub actor: AuthorSummary,
    /// Related log.
    pub log_id: Option<LogId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When the recipient read it.
    pub read_at: Option<DateTime<Utc>>,
}

/// Live event broadcast after a notification is stored.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A notification was stored for `recipient`.
    NotificationCreated {
        /// Notification identifier.
        notification_id: NotificationId,
        /// User being notified.
        recipient: UserId,
        /// User who acted.
        actor: UserId,
        /// Activity kind.
        kind: NotificationKind,
        /// Related log.
        log_id: Option<LogId>,
        /// Related comment.
        comment_id: Option<CommentId>,
        /// Creation time.
        timestamp: DateTime<Utc>,
    },
}

impl NotificationEvent {
    /// Returns the user this event is addressed to.
    #[must_use]
    pub const fn recipient(&self) -> UserId {
        match self {
            Self::NotificationCreated { recipient, .. } => *recipient,
        }
    }

    /// Returns the event type as a static string.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::NotificationCreated { .. } => "notification_created",
        }
    }
}

impl From<&NewNotification> for NotificationEvent {
    fn from(n: &NewNotification) -> Self {
        Self::NotificationCreated {
            notification_id: n.id,
            recipient: n.recipient,
            actor: n.actor,
            kind: n.kind,
            log_id: n.log_id,
            comment_id: n.comment_id,
            timestamp: n.created_at,
        }
    }
}
