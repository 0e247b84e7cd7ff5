//! Feed composition: the community feed, per-match logs and rating stats.
//!
//! Every read here degrades to an empty result on store failure. A broken
//! feed renders as "nothing yet" rather than an error page.

use std::sync::Arc;

use crate::domain::{
    FeedItem, FeedQuery, FeedSort, FeedTab, MatchId, MatchLogSort, MatchLogsQuery, RatingStats,
    SchemaCapabilities, UserId,
};
use crate::persistence::SocialStore;

/// Composes feeds and match pages from the store.
#[derive(Debug, Clone)]
pub struct FeedService {
    store: Arc<dyn SocialStore>,
    page_size: u32,
    capabilities: SchemaCapabilities,
}

impl FeedService {
    /// Creates a new `FeedService`. A zero page size is raised to one.
    #[must_use]
    pub fn new(
        store: Arc<dyn SocialStore>,
        page_size: u32,
        capabilities: SchemaCapabilities,
    ) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            capabilities,
        }
    }

    /// Configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Schema capabilities the service was built with.
    #[must_use]
    pub const fn capabilities(&self) -> SchemaCapabilities {
        self.capabilities
    }

    /// One page of the community feed. Pages are numbered from zero.
    ///
    /// The friends tab is empty for anonymous viewers.
    pub async fn feed(
        &self,
        tab: FeedTab,
        sort: FeedSort,
        page: u32,
        viewer: Option<UserId>,
    ) -> Vec<FeedItem> {
        let friends_only = tab == FeedTab::Friends;
        if friends_only && viewer.is_none() {
            return Vec::new();
        }

        let query = FeedQuery {
            friends_only,
            sort,
            viewer,
            limit: self.page_size,
            offset: page.saturating_mul(self.page_size),
        };
        self.store.feed(&query).await.unwrap_or_else(|e| {
            tracing::warn!(?tab, ?sort, page, error = %e, "failed to load feed");
            Vec::new()
        })
    }

    /// Logs for one match, capped at the page size.
    ///
    /// `friends_only` is empty for anonymous viewers. Without engagement
    /// tables the like and comment counts are zero.
    pub async fn logs_for_match(
        &self,
        match_id: MatchId,
        sort: MatchLogSort,
        friends_only: bool,
        viewer: Option<UserId>,
    ) -> Vec<FeedItem> {
        if friends_only && viewer.is_none() {
            return Vec::new();
        }

        let query = MatchLogsQuery {
            match_id,
            sort,
            friends_only,
            viewer,
            with_engagement: self.capabilities.engagement_tables,
            limit: self.page_size,
        };
        self.store.logs_for_match(&query).await.unwrap_or_else(|e| {
            tracing::warn!(%match_id, ?sort, error = %e, "failed to load match logs");
            Vec::new()
        })
    }

    /// Rating histogram, count and average for a match.
    pub async fn match_rating_stats(&self, match_id: MatchId) -> RatingStats {
        match self.store.match_ratings(match_id).await {
            Ok(ratings) => RatingStats::from_ratings(&ratings),
            Err(e) => {
                tracing::warn!(%match_id, error = %e, "failed to load match ratings");
                RatingStats::empty()
            }
        }
    }
}
