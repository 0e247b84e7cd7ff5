//! Like, comment and follow DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Comment, LikeToggle};

/// Response body for `POST /logs/{id}/like`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct LikeResponse {
    /// Always `true`.
    pub ok: bool,
    /// Like state after the toggle.
    pub state: LikeToggle,
}

/// Request body for `POST /logs/{id}/comments`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text, cut to 500 characters.
    pub body: String,
}

/// Response body for `POST /logs/{id}/comments`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentResponse {
    /// Always `true`.
    pub ok: bool,
    /// The stored comment.
    pub comment: Comment,
}

/// Response body for `GET /logs/{id}/comments`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentListResponse {
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
}

/// Response body for follow and unfollow.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct FollowResponse {
    /// Always `true`.
    pub ok: bool,
    /// Whether the caller now follows the target.
    pub following: bool,
}
