//! Match log DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::MatchLog;
use crate::service::LogDraft;

/// Request body for `POST /logs`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLogRequest {
    /// Match being logged.
    pub match_id: i64,
    /// Rating in stars, 0.5 to 5 in half steps.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Review text, cut to 180 characters.
    #[serde(default)]
    pub review: Option<String>,
    /// Date watched as `YYYY-MM-DD`.
    #[serde(default)]
    pub watched_on: Option<String>,
    /// Whether this is a rewatch.
    #[serde(default)]
    pub is_rewatch: bool,
    /// Whether the review contains spoilers.
    #[serde(default)]
    pub has_spoilers: bool,
}

impl From<CreateLogRequest> for LogDraft {
    fn from(req: CreateLogRequest) -> Self {
        Self {
            rating: req.rating,
            review: req.review,
            watched_on: req.watched_on,
            is_rewatch: req.is_rewatch,
            has_spoilers: req.has_spoilers,
        }
    }
}

/// Response body for `POST /logs`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogResponse {
    /// Always `true`.
    pub ok: bool,
    /// The stored log.
    pub log: MatchLog,
}
