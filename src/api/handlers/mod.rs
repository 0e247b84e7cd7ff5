//! REST endpoint handlers organized by resource.

pub mod engagement;
pub mod feed;
pub mod logs;
pub mod notifications;
pub mod profiles;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::domain::MatchId;
use crate::error::TouchlineError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(profiles::routes())
        .merge(logs::routes())
        .merge(engagement::routes())
        .merge(feed::routes())
        .merge(notifications::routes())
}

/// Parses a match id path segment.
pub(crate) fn parse_match_id(raw: &str) -> Result<MatchId, TouchlineError> {
    raw.trim()
        .parse::<i64>()
        .map(MatchId::new)
        .map_err(|_| TouchlineError::InvalidRequest("invalid match id".to_string()))
}
