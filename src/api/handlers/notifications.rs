//! Notification handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    NotificationListResponse, NotificationParams, UnreadCountResponse, UpdatedResponse,
};
use crate::api::extract::{ApiQuery, AuthUser, MaybeUser};
use crate::app_state::AppState;
use crate::domain::NotificationId;
use crate::error::{ErrorResponse, TouchlineError};
use crate::service::notification_service::page_limit;

/// `GET /notifications` — The caller's notifications, newest first.
///
/// Anonymous callers get an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "List notifications",
    description = "Returns notifications strictly older than `before`, newest first. Pass `next_cursor` back as `before` for the next page.",
    params(NotificationParams),
    responses(
        (status = 200, description = "Notifications, empty when not signed in", body = NotificationListResponse),
        (status = 400, description = "Malformed limit or cursor", body = ErrorResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(params): ApiQuery<NotificationParams>,
) -> Result<impl IntoResponse, TouchlineError> {
    let notifications = state
        .notifications
        .list(viewer, params.limit, params.before)
        .await;
    let full = u32::try_from(notifications.len()).is_ok_and(|n| n >= page_limit(params.limit));
    let next_cursor = if full {
        notifications.last().map(|n| n.created_at)
    } else {
        None
    };
    Ok(Json(NotificationListResponse {
        notifications,
        next_cursor,
    }))
}

/// `GET /notifications/unread-count` — Number of unread notifications.
///
/// # Errors
///
/// Returns [`TouchlineError::Unauthenticated`] for anonymous requests.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    tag = "Notifications",
    summary = "Unread count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, TouchlineError> {
    let count = state.notifications.unread_count(user.id()).await;
    Ok(Json(UnreadCountResponse { count }))
}

/// `POST /notifications/read-all` — Mark every notification read.
///
/// # Errors
///
/// Returns [`TouchlineError::Unauthenticated`] for anonymous requests or a
/// [`TouchlineError::PersistenceError`] on store failure.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    tag = "Notifications",
    summary = "Mark all read",
    responses(
        (status = 200, description = "Rows updated", body = UpdatedResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, TouchlineError> {
    let updated = state.notifications.mark_all_read(user.id()).await?;
    Ok(Json(UpdatedResponse { ok: true, updated }))
}

/// `POST /notifications/{id}/read` — Mark one notification read.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed id or a
/// [`TouchlineError::PersistenceError`] on store failure.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    tag = "Notifications",
    summary = "Mark one read",
    description = "Marks one of the caller's notifications read. Someone else's notification reports zero updates.",
    params(
        ("id" = uuid::Uuid, Path, description = "Notification UUID"),
    ),
    responses(
        (status = 200, description = "Rows updated", body = UpdatedResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn mark_one_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let id = NotificationId::parse(&id)?;
    let updated = state.notifications.mark_one_read(id, user.id()).await?;
    Ok(Json(UpdatedResponse { ok: true, updated }))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}/read", post(mark_one_read))
}
