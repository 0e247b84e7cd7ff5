//! Profile provisioning and public profile lookup.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::profile::{base_username, username_candidate, with_suffix};
use crate::domain::{NewProfile, Profile, ProfileInsert, ProfileStats, UserId};
use crate::error::TouchlineError;
use crate::identity::Principal;
use crate::persistence::SocialStore;

/// Numbered username candidates tried before falling back to a random
/// suffix.
pub const MAX_USERNAME_ATTEMPTS: u32 = 100;

/// A profile together with its counters and the viewer's relation to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProfileView {
    /// Profile row.
    pub profile: Profile,
    /// Follower, following and log counts.
    pub stats: ProfileStats,
    /// Whether the viewer follows this profile.
    pub viewer_follows: bool,
}

/// Creates profile rows on first access and serves public profiles.
#[derive(Debug, Clone)]
pub struct ProfileService {
    store: Arc<dyn SocialStore>,
}

impl ProfileService {
    /// Creates a new `ProfileService`.
    #[must_use]
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Returns the principal's profile, creating it if missing.
    ///
    /// Username collisions are resolved with numeric suffixes for at most
    /// [`MAX_USERNAME_ATTEMPTS`] attempts, then with a random hex suffix.
    ///
    /// # Errors
    ///
    /// Returns a [`TouchlineError::PersistenceError`] on store failure, or
    /// [`TouchlineError::Internal`] if no username could be claimed.
    pub async fn ensure_profile(&self, principal: &Principal) -> Result<Profile, TouchlineError> {
        if let Some(profile) = self.store.profile_by_id(principal.id).await? {
            return Ok(profile);
        }

        let meta = &principal.metadata;
        let base = base_username(&[
            meta.preferred_username.as_deref(),
            meta.full_name.as_deref(),
            principal.email.as_deref(),
        ]);

        let candidates = (0..MAX_USERNAME_ATTEMPTS)
            .map(|attempt| username_candidate(&base, attempt))
            .chain(std::iter::once_with(|| {
                let random = uuid::Uuid::new_v4().simple().to_string();
                with_suffix(&base, random.get(..8).unwrap_or(&random))
            }));

        for username in candidates {
            let new = NewProfile {
                id: principal.id,
                username,
                display_name: meta.full_name.clone(),
                avatar_url: meta.avatar_url.clone(),
            };
            match self.store.insert_profile(&new).await? {
                ProfileInsert::Created(profile) => {
                    tracing::info!(user = %profile.id, username = %profile.username, "profile created");
                    return Ok(profile);
                }
                ProfileInsert::AlreadyExists => {
                    if let Some(profile) = self.store.profile_by_id(principal.id).await? {
                        return Ok(profile);
                    }
                }
                ProfileInsert::UsernameTaken => {
                    tracing::debug!(username = %new.username, "username taken, retrying");
                }
            }
        }

        Err(TouchlineError::Internal(format!(
            "could not allocate a username for {}",
            principal.id
        )))
    }

    /// Public profile by username with counters and follow state.
    ///
    /// # Errors
    ///
    /// Returns [`TouchlineError::NotFound`] if no such user exists, or a
    /// [`TouchlineError::PersistenceError`] on store failure.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<UserId>,
    ) -> Result<ProfileView, TouchlineError> {
        let profile = self
            .store
            .profile_by_username(username)
            .await?
            .ok_or_else(|| TouchlineError::NotFound("user".to_string()))?;

        let stats = self.store.profile_stats(profile.id).await?;
        let viewer_follows = match viewer {
            Some(viewer) if viewer != profile.id => {
                self.store.is_following(viewer, profile.id).await?
            }
            _ => false,
        };

        Ok(ProfileView {
            profile,
            stats,
            viewer_follows,
        })
    }
}
