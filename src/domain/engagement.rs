//! Likes, comments and follow edges.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{AuthorSummary, CommentId, LogId};
use crate::error::TouchlineError;

/// Maximum stored comment length in characters.
pub const MAX_COMMENT_CHARS: usize = 500;

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    /// The like row was inserted.
    Liked,
    /// The like row was removed.
    Unliked,
}

/// A comment joined with its author's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Log the comment belongs to.
    pub log_id: LogId,
    /// Author identity.
    pub author: AuthorSummary,
    /// Comment text.
    pub body: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Normalises a comment body: trimmed, rejected when empty, silently cut
/// to [`MAX_COMMENT_CHARS`].
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] when nothing but whitespace
/// was submitted.
pub fn comment_body(raw: &str) -> Result<String, TouchlineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TouchlineError::InvalidRequest(
            "comment cannot be empty".to_string(),
        ));
    }
    Ok(super::match_log::truncate_chars(trimmed, MAX_COMMENT_CHARS))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_comment_is_rejected() {
        assert!(comment_body(" \n\t ").is_err());
    }

    #[test]
    fn long_comment_keeps_first_500_chars() {
        let raw: String = "abcdefghij".repeat(60);
        let Ok(body) = comment_body(&raw) else {
            panic!("long comment rejected");
        };
        assert_eq!(body.chars().count(), MAX_COMMENT_CHARS);
        assert_eq!(body, raw.chars().take(MAX_COMMENT_CHARS).collect::<String>());
    }
}
