//! # touchline
//!
//! Social feed and engagement service for a football match diary.
//!
//! Users log the matches they watched (with an optional half-star rating and
//! a short review), like and comment on each other's logs, follow each
//! other, read a community feed and receive notifications. Match fixtures
//! and sign-in are owned by other systems; this crate reads the first and
//! trusts the second.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Identity (identity)
//!     │
//!     ├── Services (service/)
//!     │     ├── ProfileService, LogService
//!     │     ├── EngagementService ── RateLimiter
//!     │     ├── FeedService
//!     │     └── NotificationService ── EventBus (domain/)
//!     │
//!     └── SocialStore (persistence/)
//!           ├── PostgresStore
//!           └── MemoryStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod persistence;
pub mod service;
pub mod ws;
