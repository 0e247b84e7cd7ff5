//! User profiles and username derivation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;

/// Minimum username length.
pub const MIN_USERNAME_LEN: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LEN: usize = 20;

/// Username used when nothing usable can be derived from the principal.
pub const FALLBACK_USERNAME: &str = "fan";

/// A stored profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Profile {
    /// Same id as the identity provider's user.
    pub id: UserId,
    /// Unique, case-insensitive handle.
    pub username: String,
    /// Name shown next to posts.
    pub display_name: Option<String>,
    /// Free-form bio.
    pub bio: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Personal website.
    pub website_url: Option<String>,
    /// X (Twitter) handle.
    pub x_handle: Option<String>,
    /// Instagram handle.
    pub instagram_handle: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields for a lazily provisioned profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Principal id.
    pub id: UserId,
    /// Candidate username.
    pub username: String,
    /// Display name from identity metadata.
    pub display_name: Option<String>,
    /// Avatar URL from identity metadata.
    pub avatar_url: Option<String>,
}

/// Result of attempting to insert a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileInsert {
    /// Row created.
    Created(Profile),
    /// Another profile already owns this username.
    UsernameTaken,
    /// A row with this id already exists (concurrent provisioning).
    AlreadyExists,
}

/// Public identity attached to posts, comments and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorSummary {
    /// User id.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

impl From<&Profile> for AuthorSummary {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id,
            username: p.username.clone(),
            display_name: p.display_name.clone(),
            avatar_url: p.avatar_url.clone(),
        }
    }
}

/// Aggregate counters shown on a profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProfileStats {
    /// Users following this profile.
    pub followers: i64,
    /// Users this profile follows.
    pub following: i64,
    /// Match logs written.
    pub logs: i64,
}

/// Derives a base username from identity metadata.
///
/// Keeps `[a-z0-9_]` after lowercasing, cuts to [`MAX_USERNAME_LEN`] and
/// falls back to [`FALLBACK_USERNAME`] when fewer than
/// [`MIN_USERNAME_LEN`] characters survive.
#[must_use]
pub fn base_username(candidates: &[Option<&str>]) -> String {
    for raw in candidates.iter().flatten() {
        let cleaned = sanitize_username(raw);
        if cleaned.len() >= MIN_USERNAME_LEN {
            return cleaned;
        }
    }
    FALLBACK_USERNAME.to_string()
}

fn sanitize_username(raw: &str) -> String {
    let local = raw.split('@').next().unwrap_or(raw);
    local
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .take(MAX_USERNAME_LEN)
        .collect()
}

/// Username to try on the given collision attempt (`0` is the bare base).
///
/// The suffix always fits: the base is shortened to make room for it.
#[must_use]
pub fn username_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        return base.to_string();
    }
    with_suffix(base, &attempt.to_string())
}

/// Appends `suffix` to `base`, shortening `base` to stay within
/// [`MAX_USERNAME_LEN`].
#[must_use]
pub fn with_suffix(base: &str, suffix: &str) -> String {
    let keep = MAX_USERNAME_LEN.saturating_sub(suffix.len());
    let head: String = base.chars().take(keep).collect();
    format!("{head}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_username_prefers_first_usable_candidate() {
        let name = base_username(&[None, Some("Jürgen K."), Some("jk@example.com")]);
        assert_eq!(name, "jrgenk");
    }

    #[test]
    fn base_username_uses_email_local_part() {
        let name = base_username(&[None, Some("x"), Some("Kop.End_1892@example.com")]);
        assert_eq!(name, "kopend_1892");
    }

    #[test]
    fn base_username_falls_back() {
        assert_eq!(base_username(&[None, Some("!!"), None]), FALLBACK_USERNAME);
    }

    #[test]
    fn base_username_is_capped() {
        let name = base_username(&[Some("abcdefghijklmnopqrstuvwxyz")]);
        assert_eq!(name.len(), MAX_USERNAME_LEN);
    }

    #[test]
    fn candidates_append_numeric_suffix_within_limit() {
        assert_eq!(username_candidate("fan", 0), "fan");
        assert_eq!(username_candidate("fan", 7), "fan7");
        let long = "a".repeat(MAX_USERNAME_LEN);
        let candidate = username_candidate(&long, 42);
        assert_eq!(candidate.len(), MAX_USERNAME_LEN);
        assert!(candidate.ends_with("42"));
    }
}
