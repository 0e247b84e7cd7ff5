//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain types that already serialize in their wire shape (profiles,
//! feed items, comments, notifications) are returned directly; the types
//! here wrap them or describe request bodies and query strings.

pub mod common_dto;
pub mod engagement_dto;
pub mod feed_dto;
pub mod log_dto;
pub mod notification_dto;

pub use common_dto::*;
pub use engagement_dto::*;
pub use feed_dto::*;
pub use log_dto::*;
pub use notification_dto::*;
