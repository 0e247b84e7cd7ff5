//! Feed and match page DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{FeedItem, FeedSort, FeedTab, MatchLogSort};

/// Query parameters for `GET /feed`.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedParams {
    /// `global` (default) or `friends`.
    #[serde(default)]
    pub tab: FeedTab,
    /// `newest` (default) or `trending`.
    #[serde(default)]
    pub sort: FeedSort,
    /// Zero-based page number.
    #[serde(default)]
    pub page: u32,
}

/// Response body for `GET /feed`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedResponse {
    /// Feed items for this page.
    pub items: Vec<FeedItem>,
    /// Page that was served.
    pub page: u32,
    /// Next page number when this page was full.
    pub next_page: Option<u32>,
}

/// Query parameters for `GET /matches/{id}/logs`.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchLogsParams {
    /// `likes` (default) or `recency`.
    #[serde(default)]
    pub sort: MatchLogSort,
    /// Only logs by users the viewer follows.
    #[serde(default)]
    pub friends: bool,
}

/// Response body for `GET /matches/{id}/logs`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchLogsResponse {
    /// Logs for the match.
    pub items: Vec<FeedItem>,
}
