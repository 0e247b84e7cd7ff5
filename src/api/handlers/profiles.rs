//! Profile handlers: the signed-in user, public profiles and follows.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::FollowResponse;
use crate::api::extract::{AuthUser, MaybeUser};
use crate::app_state::AppState;
use crate::domain::{Profile, UserId};
use crate::error::{ErrorResponse, TouchlineError};
use crate::service::ProfileView;

/// `GET /me` — The signed-in user's profile, created on first access.
///
/// # Errors
///
/// Returns [`TouchlineError::Unauthenticated`] for anonymous requests.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Profiles",
    summary = "Current profile",
    description = "Returns the caller's profile, provisioning it with a unique username on first access.",
    responses(
        (status = 200, description = "Caller profile", body = Profile),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn me(AuthUser(profile): AuthUser) -> Result<impl IntoResponse, TouchlineError> {
    Ok(Json(profile))
}

/// `GET /users/{user}` — Public profile by username.
///
/// # Errors
///
/// Returns [`TouchlineError::NotFound`] if no such user exists.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user}",
    tag = "Profiles",
    summary = "Public profile",
    description = "Returns a profile with follower, following and log counts. Username lookup ignores case.",
    params(
        ("user" = String, Path, description = "Username"),
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let view = state.profiles.profile(&username, viewer).await?;
    Ok(Json(view))
}

/// `POST /users/{user}/follow` — Follow a user.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a malformed id or a
/// self-follow, or [`TouchlineError::NotFound`] if the target is missing.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user}/follow",
    tag = "Profiles",
    summary = "Follow a user",
    description = "Adds a follow edge. Following someone twice is a no-op. New edges notify the target.",
    params(
        ("user" = uuid::Uuid, Path, description = "Target user UUID"),
    ),
    responses(
        (status = 200, description = "Following", body = FollowResponse),
        (status = 400, description = "Invalid target", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn follow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(target): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let target = UserId::parse(&target)?;
    state.engagement.follow(user.id(), target).await?;
    Ok(Json(FollowResponse {
        ok: true,
        following: true,
    }))
}

/// `DELETE /users/{user}/follow` — Unfollow a user.
///
/// # Errors
///
/// Returns [`TouchlineError::Forbidden`] for the pinned account, plus the
/// same errors as [`follow`].
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user}/follow",
    tag = "Profiles",
    summary = "Unfollow a user",
    description = "Removes a follow edge. The pinned account, when configured, cannot be unfollowed.",
    params(
        ("user" = uuid::Uuid, Path, description = "Target user UUID"),
    ),
    responses(
        (status = 200, description = "Not following", body = FollowResponse),
        (status = 400, description = "Invalid target", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Pinned account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn unfollow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(target): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let target = UserId::parse(&target)?;
    state.engagement.unfollow(user.id(), target).await?;
    Ok(Json(FollowResponse {
        ok: true,
        following: false,
    }))
}

/// Profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/users/{user}", get(get_profile))
        .route("/users/{user}/follow", post(follow).delete(unfollow))
}
