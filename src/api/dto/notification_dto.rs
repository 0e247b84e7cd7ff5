//! Notification DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Notification;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationParams {
    /// Page size, default 20, at most 50.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Only notifications strictly older than this instant.
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
}

/// Response body for `GET /notifications`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationListResponse {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Cursor for the next page when this page was full.
    pub next_cursor: Option<DateTime<Utc>>,
}

/// Response body for `GET /notifications/unread-count`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    /// Unread notifications.
    pub count: i64,
}
