//! Liveness check, mounted outside `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Liveness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when likes and comments are unavailable.
    status: String,
    /// Crate version.
    version: String,
    /// Whether the engagement tables were found at startup.
    engagement_tables: bool,
    /// Open WebSocket connections.
    live_connections: usize,
    /// Server time.
    timestamp: DateTime<Utc>,
}

/// `GET /health` — Liveness and schema status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports whether the server is up, whether engagement features are \
                   available, and how many WebSocket clients are connected.",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let engagement_tables = state.feed.capabilities().engagement_tables;
    Json(HealthResponse {
        status: if engagement_tables {
            "healthy"
        } else {
            "degraded"
        }
        .to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        engagement_tables,
        live_connections: state.event_bus.receiver_count(),
        timestamp: Utc::now(),
    })
}

/// Routes mounted at the root.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
