//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Bare acknowledgement for writes with nothing else to report.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct AckResponse {
    /// Always `true`.
    pub ok: bool,
}

impl AckResponse {
    /// A successful acknowledgement.
    #[must_use]
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

/// Count of rows touched by a bulk update.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct UpdatedResponse {
    /// Always `true`.
    pub ok: bool,
    /// Rows updated; zero is not an error.
    pub updated: u64,
}
