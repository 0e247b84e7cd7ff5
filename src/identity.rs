//! Identity provider adapter.
//!
//! Sessions are owned by an external identity provider. This service only
//! needs to know who the current principal is; [`IdentityProvider`]
//! answers that from the request headers. [`TrustedHeaderIdentity`] reads
//! headers injected by the authenticating reverse proxy in front of the
//! service, which strips any client-supplied copies.

use std::fmt;

use axum::http::HeaderMap;

use crate::config::AppConfig;
use crate::domain::UserId;

/// Profile hints supplied by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalMetadata {
    /// Handle chosen at sign-up.
    pub preferred_username: Option<String>,
    /// Full display name.
    pub full_name: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable user id.
    pub id: UserId,
    /// Email address, if shared.
    pub email: Option<String>,
    /// Profile hints.
    pub metadata: PrincipalMetadata,
}

/// Resolves the current principal of a request.
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Returns the principal, or `None` for an anonymous request.
    fn current_user(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// Reads the principal from headers set by an authenticating proxy.
#[derive(Debug, Clone)]
pub struct TrustedHeaderIdentity {
    user_id_header: String,
    email_header: String,
    name_header: String,
}

impl TrustedHeaderIdentity {
    /// Creates an adapter reading the given header names.
    #[must_use]
    pub fn new(
        user_id_header: impl Into<String>,
        email_header: impl Into<String>,
        name_header: impl Into<String>,
    ) -> Self {
        Self {
            user_id_header: user_id_header.into(),
            email_header: email_header.into(),
            name_header: name_header.into(),
        }
    }

    /// Creates an adapter using the configured header names.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.identity_user_id_header.as_str(),
            config.identity_email_header.as_str(),
            config.identity_name_header.as_str(),
        )
    }

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    }
}

impl Default for TrustedHeaderIdentity {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl IdentityProvider for TrustedHeaderIdentity {
    fn current_user(&self, headers: &HeaderMap) -> Option<Principal> {
        let raw_id = Self::header(headers, &self.user_id_header)?;
        let Ok(id) = UserId::parse(&raw_id) else {
            tracing::warn!(header = %self.user_id_header, "ignoring malformed user id header");
            return None;
        };
        let name = Self::header(headers, &self.name_header);
        Some(Principal {
            id,
            email: Self::header(headers, &self.email_header),
            metadata: PrincipalMetadata {
                preferred_username: name.clone(),
                full_name: name,
                avatar_url: None,
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            let Ok(value) = HeaderValue::from_str(v) else {
                panic!("bad header value");
            };
            map.insert(*k, value);
        }
        map
    }

    #[test]
    fn anonymous_without_user_header() {
        let identity = TrustedHeaderIdentity::default();
        assert!(identity.current_user(&HeaderMap::new()).is_none());
    }

    #[test]
    fn malformed_user_id_is_anonymous() {
        let identity = TrustedHeaderIdentity::default();
        assert!(identity
            .current_user(&headers(&[("x-user-id", "42")]))
            .is_none());
    }

    #[test]
    fn principal_carries_email_and_name() {
        let identity = TrustedHeaderIdentity::default();
        let id = UserId::new();
        let raw_id = id.to_string();
        let Some(principal) = identity.current_user(&headers(&[
            ("x-user-id", raw_id.as_str()),
            ("x-user-email", "ana@example.com"),
            ("x-user-name", "Ana"),
        ])) else {
            panic!("principal expected");
        };
        assert_eq!(principal.id, id);
        assert_eq!(principal.email.as_deref(), Some("ana@example.com"));
        assert_eq!(principal.metadata.preferred_username.as_deref(), Some("Ana"));
    }
}
