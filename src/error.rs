//! Service error types with HTTP status code mapping.
//!
//! [`TouchlineError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "ok": false,
///   "error": {
///     "code": 1001,
///     "message": "invalid request: rating must be between 0.5 and 5 in half steps"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` for error bodies.
    pub ok: bool,
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`TouchlineError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status               |
/// |-----------|-----------------------|---------------------------|
/// | 1000–1099 | Validation            | 400 Bad Request           |
/// | 1100–1199 | Authentication/policy | 401 / 403                 |
/// | 1200–1299 | Throttling            | 429 Too Many Requests     |
/// | 2000–2999 | Not Found             | 404 Not Found             |
/// | 3000–3999 | Server                | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum TouchlineError {
    /// Request validation failed before any write.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No authenticated principal on a write path.
    #[error("you must be signed in to do that")]
    Unauthenticated,

    /// The principal may not perform this action.
    #[error("{0}")]
    Forbidden(String),

    /// Target entity does not exist or is not visible to the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// Caller exceeded a per-action rate limit.
    #[error("too many requests; try again in a few minutes")]
    RateLimited {
        /// Seconds until the trailing window has fully elapsed.
        retry_after_secs: u64,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TouchlineError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthenticated => 1101,
            Self::Forbidden(_) => 1102,
            Self::RateLimited { .. } => 1201,
            Self::NotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for TouchlineError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for TouchlineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = ErrorResponse {
            ok: false,
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, secs.into());
        }
        response
    }
}
