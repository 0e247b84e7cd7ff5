//! Like and comment handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CommentListResponse, CommentResponse, CreateCommentRequest, LikeResponse};
use crate::api::extract::{ApiJson, AuthUser};
use crate::app_state::AppState;
use crate::domain::LogId;
use crate::error::{ErrorResponse, TouchlineError};

/// `POST /logs/{id}/like` — Toggle the caller's like on a log.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed id,
/// [`TouchlineError::RateLimited`] past the like ceiling, or
/// [`TouchlineError::NotFound`] for an unknown log.
#[utoipa::path(
    post,
    path = "/api/v1/logs/{id}/like",
    tag = "Engagement",
    summary = "Toggle like",
    description = "Likes the log if the caller has not liked it yet, otherwise removes the like. Only liking notifies the author.",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    responses(
        (status = 200, description = "New like state", body = LikeResponse),
        (status = 400, description = "Malformed log id", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Log not found", body = ErrorResponse),
        (status = 429, description = "Too many likes", body = ErrorResponse),
    )
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let log_id = LogId::parse(&id)?;
    let toggle = state.engagement.toggle_like(user.id(), log_id).await?;
    Ok(Json(LikeResponse {
        ok: true,
        state: toggle,
    }))
}

/// `GET /logs/{id}/comments` — Comments on a log.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed id.
#[utoipa::path(
    get,
    path = "/api/v1/logs/{id}/comments",
    tag = "Engagement",
    summary = "List comments",
    description = "Returns the log's comments, oldest first, each with its author.",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    responses(
        (status = 200, description = "Comments", body = CommentListResponse),
        (status = 400, description = "Malformed log id", body = ErrorResponse),
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let log_id = LogId::parse(&id)?;
    let comments = state.engagement.list_comments(log_id).await;
    Ok(Json(CommentListResponse { comments }))
}

/// `POST /logs/{id}/comments` — Comment on a log.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed id or an
/// empty body, or [`TouchlineError::NotFound`] for an unknown log.
#[utoipa::path(
    post,
    path = "/api/v1/logs/{id}/comments",
    tag = "Engagement",
    summary = "Add comment",
    description = "Adds a comment, trimmed and cut to 500 characters, and notifies the log author.",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment stored", body = CommentResponse),
        (status = 400, description = "Malformed id or empty body", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Log not found", body = ErrorResponse),
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, TouchlineError> {
    let log_id = LogId::parse(&id)?;
    let comment = state
        .engagement
        .create_comment(user.id(), log_id, &req.body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse { ok: true, comment }),
    ))
}

/// Engagement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logs/{id}/like", post(toggle_like))
        .route("/logs/{id}/comments", get(list_comments).post(create_comment))
}
