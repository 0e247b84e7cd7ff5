//! Type-safe identifiers.
//!
//! Every UUID-keyed entity gets its own newtype so that a log id cannot be
//! passed where a user id is expected. Match ids come from the external
//! fixtures provider and are plain integers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::TouchlineError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            ToSchema, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Parses a client-supplied identifier.
            ///
            /// # Errors
            ///
            /// Returns [`TouchlineError::InvalidRequest`] when `raw` is not a
            /// canonical UUID.
            pub fn parse(raw: &str) -> Result<Self, TouchlineError> {
                uuid::Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| TouchlineError::InvalidRequest(format!("invalid {}", $label)))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifier of a user, issued by the identity provider.
    UserId,
    "user id"
);

uuid_id!(
    /// Identifier of a match log ("post").
    LogId,
    "log id"
);

uuid_id!(
    /// Identifier of a comment on a match log.
    CommentId,
    "comment id"
);

uuid_id!(
    /// Identifier of a notification.
    NotificationId,
    "notification id"
);

/// Identifier of a match, owned by the fixtures ingestion process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct MatchId(i64);

impl MatchId {
    /// Wraps a raw provider id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw provider id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
