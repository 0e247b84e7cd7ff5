//! Feed items, feed queries and rating statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthorSummary, LogId, MatchId, MatchSummary, UserId};

/// Which population of logs a feed draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedTab {
    /// Every user's logs.
    #[default]
    Global,
    /// Only logs by users the viewer follows.
    Friends,
}

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Most commented first, then most recent.
    Trending,
}

/// Ordering of the logs shown on a match page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchLogSort {
    /// Most liked first, then most recent.
    #[default]
    Likes,
    /// Most recent first.
    Recency,
}

/// Which optional tables the connected schema provides.
///
/// Older deployments lack the like and comment tables; reads against
/// those deployments skip the engagement aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCapabilities {
    /// `log_likes` and `log_comments` exist.
    pub engagement_tables: bool,
}

impl Default for SchemaCapabilities {
    fn default() -> Self {
        Self {
            engagement_tables: true,
        }
    }
}

/// One log as rendered in a feed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FeedItem {
    /// Log identifier.
    pub log_id: LogId,
    /// Author identity.
    pub author: AuthorSummary,
    /// Match facts.
    #[serde(rename = "match")]
    pub match_summary: MatchSummary,
    /// Rating in stars.
    pub rating: Option<f64>,
    /// Review text.
    pub review: Option<String>,
    /// Watched date.
    pub watched_on: Option<NaiveDate>,
    /// Rewatch flag.
    pub is_rewatch: bool,
    /// Spoiler flag.
    pub has_spoilers: bool,
    /// Log creation time.
    pub created_at: DateTime<Utc>,
    /// Aggregated likes.
    pub like_count: i64,
    /// Aggregated comments.
    pub comment_count: i64,
    /// Whether the viewer has liked this log.
    pub viewer_liked: bool,
}

/// Parameters of a feed read, resolved by the feed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    /// Restrict to followed authors.
    pub friends_only: bool,
    /// Ordering.
    pub sort: FeedSort,
    /// Viewer for friend restriction and `viewer_liked`.
    pub viewer: Option<UserId>,
    /// Page size.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
}

/// Parameters of a per-match log read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLogsQuery {
    /// Match to read.
    pub match_id: MatchId,
    /// Ordering.
    pub sort: MatchLogSort,
    /// Restrict to followed authors.
    pub friends_only: bool,
    /// Viewer for friend restriction and `viewer_liked`.
    pub viewer: Option<UserId>,
    /// Aggregate likes and comments.
    pub with_engagement: bool,
    /// Maximum rows.
    pub limit: u32,
}

/// Rating distribution for one match.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingStats {
    /// Counts for 1 to 5 stars.
    #[schema(value_type = Vec<u32>)]
    pub histogram: [u32; 5],
    /// Number of ratings.
    pub count: u32,
    /// Mean rating rounded to one decimal.
    pub average: Option<f64>,
}

impl RatingStats {
    /// Stats with no ratings.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            histogram: [0; 5],
            count: 0,
            average: None,
        }
    }

    /// Buckets ratings by nearest whole star (halves round up) and averages
    /// them.
    #[must_use]
    pub fn from_ratings(ratings: &[f64]) -> Self {
        let mut stats = Self::empty();
        let mut sum = 0.0;
        for &rating in ratings.iter().filter(|r| r.is_finite()) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let star = rating.round().clamp(1.0, 5.0) as usize;
            if let Some(bucket) = stats.histogram.get_mut(star - 1) {
                *bucket += 1;
            }
            stats.count += 1;
            sum += rating;
        }
        if stats.count > 0 {
            let mean = sum / f64::from(stats.count);
            stats.average = Some((mean * 10.0).round() / 10.0);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ratings_give_zeroed_stats() {
        let stats = RatingStats::from_ratings(&[]);
        assert_eq!(stats, RatingStats::empty());
        assert_eq!(stats.average, None);
    }

    #[test]
    fn halves_round_up_into_buckets() {
        let stats = RatingStats::from_ratings(&[0.5, 1.5, 2.5, 4.5, 5.0, 3.0]);
        assert_eq!(stats.histogram, [1, 1, 2, 0, 2]);
        assert_eq!(stats.count, 6);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let stats = RatingStats::from_ratings(&[4.5, 4.0, 3.5]);
        assert_eq!(stats.average, Some(4.0));
        let stats = RatingStats::from_ratings(&[5.0, 4.5, 4.5]);
        assert_eq!(stats.average, Some(4.7));
    }

    #[test]
    fn query_enums_use_snake_case() {
        assert_eq!(
            serde_json::from_str::<FeedTab>("\"friends\"").ok(),
            Some(FeedTab::Friends)
        );
        assert_eq!(
            serde_json::from_str::<FeedSort>("\"trending\"").ok(),
            Some(FeedSort::Trending)
        );
        assert_eq!(
            serde_json::from_str::<MatchLogSort>("\"recency\"").ok(),
            Some(MatchLogSort::Recency)
        );
    }
}
