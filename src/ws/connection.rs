//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! answering commands and forwarding the user's own notifications.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use crate::domain::{Inbox, UserId};
use crate::service::NotificationService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and answers them.
/// - Forwards every event arriving in the user's [`Inbox`].
pub async fn run_connection(
    socket: WebSocket,
    mut inbox: Inbox,
    notifications: Arc<NotificationService>,
) {
    let user = inbox.user();
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, user, &notifications).await;
                        if let Some(json) = encode(&reply)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = inbox.recv() => {
                match event {
                    Ok(event) => {
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Notification,
                            serde_json::to_value(&event).unwrap_or_default(),
                        );
                        if let Some(json) = encode(&msg)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(%user, lagged = n, "ws client lagged behind event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(%user, "ws connection closed");
}

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg)
        .inspect_err(|e| tracing::warn!(error = %e, "failed to encode ws message"))
        .ok()
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    user: UserId,
    notifications: &NotificationService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command");
    }

    match serde_json::from_value::<WsCommand>(msg.payload) {
        Ok(WsCommand::UnreadCount) => {
            let count = notifications.unread_count(user).await;
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({ "command": "unread_count", "count": count }),
            )
        }
        Ok(WsCommand::Ping) => WsMessage::new(
            msg.id,
            WsMessageType::Response,
            serde_json::json!({ "command": "ping" }),
        ),
        Err(_) => WsMessage::error(msg.id, 404, "unknown command"),
    }
}
