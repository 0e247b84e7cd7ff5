//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    AckResponse, CommentListResponse, CommentResponse, CreateCommentRequest, CreateLogRequest,
    FeedResponse, FollowResponse, LikeResponse, LogResponse, MatchLogsResponse,
    NotificationListResponse, UnreadCountResponse, UpdatedResponse,
};
use super::handlers::system::HealthResponse;
use super::handlers::{engagement, feed, logs, notifications, profiles, system};
use crate::domain::{
    AuthorSummary, Comment, FeedItem, FeedSort, FeedTab, LikeToggle, MatchLog, MatchLogSort,
    MatchStatus, MatchSummary, Notification, NotificationKind, Profile, ProfileStats, RatingStats,
};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::ProfileView;

/// Generated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "touchline",
        description = "Social feed and engagement API for a football match diary."
    ),
    paths(
        system::health_handler,
        profiles::me,
        profiles::get_profile,
        profiles::follow,
        profiles::unfollow,
        logs::create_log,
        logs::delete_log,
        engagement::toggle_like,
        engagement::list_comments,
        engagement::create_comment,
        feed::get_feed,
        feed::match_logs,
        feed::match_ratings,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_all_read,
        notifications::mark_one_read,
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        ErrorBody,
        AckResponse,
        UpdatedResponse,
        Profile,
        ProfileStats,
        ProfileView,
        AuthorSummary,
        CreateLogRequest,
        LogResponse,
        MatchLog,
        MatchSummary,
        MatchStatus,
        LikeToggle,
        LikeResponse,
        Comment,
        CreateCommentRequest,
        CommentResponse,
        CommentListResponse,
        FollowResponse,
        FeedTab,
        FeedSort,
        MatchLogSort,
        FeedItem,
        FeedResponse,
        MatchLogsResponse,
        RatingStats,
        Notification,
        NotificationKind,
        NotificationListResponse,
        UnreadCountResponse,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Profiles", description = "Profiles and follows"),
        (name = "Logs", description = "Match logs"),
        (name = "Engagement", description = "Likes and comments"),
        (name = "Feed", description = "Community feed and match pages"),
        (name = "Notifications", description = "Notification center"),
    )
)]
pub struct ApiDoc;
