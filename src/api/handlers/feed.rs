//! Feed and match page handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::parse_match_id;
use crate::api::dto::{FeedParams, FeedResponse, MatchLogsParams, MatchLogsResponse};
use crate::api::extract::{ApiQuery, MaybeUser};
use crate::app_state::AppState;
use crate::domain::RatingStats;
use crate::error::{ErrorResponse, TouchlineError};

/// `GET /feed` — One page of the community feed.
///
/// # Errors
///
/// Never fails on store errors; those yield an empty page.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    tag = "Feed",
    summary = "Community feed",
    description = "Returns logs from everyone (`tab=global`) or from followed users (`tab=friends`), sorted by `newest` or `trending` (most comments first).",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed page", body = FeedResponse),
        (status = 400, description = "Unknown tab or sort", body = ErrorResponse),
    )
)]
pub async fn get_feed(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(params): ApiQuery<FeedParams>,
) -> Result<impl IntoResponse, TouchlineError> {
    let items = state
        .feed
        .feed(params.tab, params.sort, params.page, viewer)
        .await;
    let full = u32::try_from(items.len()).is_ok_and(|n| n >= state.feed.page_size());
    Ok(Json(FeedResponse {
        items,
        page: params.page,
        next_page: full.then(|| params.page.saturating_add(1)),
    }))
}

/// `GET /matches/{id}/logs` — Logs for one match.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed match id.
#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}/logs",
    tag = "Feed",
    summary = "Match logs",
    description = "Returns logs for a match sorted by `likes` or `recency`, optionally only from followed users.",
    params(
        ("id" = i64, Path, description = "Match id"),
        MatchLogsParams,
    ),
    responses(
        (status = 200, description = "Match logs", body = MatchLogsResponse),
        (status = 400, description = "Malformed match id or query", body = ErrorResponse),
    )
)]
pub async fn match_logs(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<MatchLogsParams>,
) -> Result<impl IntoResponse, TouchlineError> {
    let match_id = parse_match_id(&id)?;
    let items = state
        .feed
        .logs_for_match(match_id, params.sort, params.friends, viewer)
        .await;
    Ok(Json(MatchLogsResponse { items }))
}

/// `GET /matches/{id}/ratings` — Rating distribution for one match.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed match id.
#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}/ratings",
    tag = "Feed",
    summary = "Match ratings",
    description = "Returns a five-bucket star histogram, the number of ratings and their average.",
    params(
        ("id" = i64, Path, description = "Match id"),
    ),
    responses(
        (status = 200, description = "Rating stats", body = RatingStats),
        (status = 400, description = "Malformed match id", body = ErrorResponse),
    )
)]
pub async fn match_ratings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let match_id = parse_match_id(&id)?;
    Ok(Json(state.feed.match_rating_stats(match_id).await))
}

/// Feed routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feed", get(get_feed))
        .route("/matches/{id}/logs", get(match_logs))
        .route("/matches/{id}/ratings", get(match_ratings))
}
