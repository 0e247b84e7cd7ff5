//! Match log handlers: create and delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Json, Router};

use crate::api::dto::{AckResponse, CreateLogRequest, LogResponse};
use crate::api::extract::{ApiJson, AuthUser};
use crate::app_state::AppState;
use crate::domain::{LogId, MatchId};
use crate::error::{ErrorResponse, TouchlineError};

/// `POST /logs` — Log a match.
///
/// # Errors
///
/// Returns [`TouchlineError::InvalidRequest`] for a bad rating or date,
/// [`TouchlineError::RateLimited`] past the log ceiling, or
/// [`TouchlineError::NotFound`] for an unknown match.
#[utoipa::path(
    post,
    path = "/api/v1/logs",
    tag = "Logs",
    summary = "Log a match",
    description = "Creates the caller's log for a match, or overwrites it if the match was already logged.",
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Log stored", body = LogResponse),
        (status = 400, description = "Invalid rating or date", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Match not found", body = ErrorResponse),
        (status = 429, description = "Too many logs", body = ErrorResponse),
    )
)]
pub async fn create_log(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateLogRequest>,
) -> Result<impl IntoResponse, TouchlineError> {
    let match_id = MatchId::new(req.match_id);
    let log = state
        .logs
        .create_log(user.id(), match_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(LogResponse { ok: true, log })))
}

/// `DELETE /logs/{id}` — Delete one of the caller's logs.
///
/// # Errors
///
/// Returns [`TouchlineError::NotFound`] if the log is missing or belongs
/// to someone else.
#[utoipa::path(
    delete,
    path = "/api/v1/logs/{id}",
    tag = "Logs",
    summary = "Delete a log",
    description = "Deletes a log owned by the caller, together with its likes and comments.",
    params(
        ("id" = uuid::Uuid, Path, description = "Log UUID"),
    ),
    responses(
        (status = 200, description = "Log deleted", body = AckResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Log not found", body = ErrorResponse),
    )
)]
pub async fn delete_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TouchlineError> {
    let log_id = LogId::parse(&id)?;
    state.logs.delete_log(user.id(), log_id).await?;
    Ok(Json(AckResponse::ok()))
}

/// Match log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logs", post(create_log))
        .route("/logs/{id}", delete(delete_log))
}
