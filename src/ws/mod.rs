//! WebSocket layer: live notification push.
//!
//! The WebSocket endpoint at `/ws` streams notifications addressed to the
//! signed-in user as they are stored, and answers a small set of commands.

pub mod connection;
pub mod handler;
pub mod messages;
