//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::api::extract::AuthUser;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade an authenticated HTTP connection to WebSocket.
///
/// Anonymous requests are rejected with `401` before the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    user: AuthUser,
) -> impl IntoResponse {
    let inbox = state.event_bus.inbox(user.id());
    let notifications = Arc::clone(&state.notifications);
    tracing::debug!(user = %user.id(), "ws upgrade");

    ws.on_upgrade(move |socket| run_connection(socket, inbox, notifications))
}
