//! Match logs: a user's record of having watched a match.
//!
//! Input validation lives on the value types ([`Rating`], [`review_text`],
//! [`WatchedOn`]) so that every write path rejects bad input before touching
//! the store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LogId, MatchId, UserId};
use crate::error::TouchlineError;

/// Maximum stored review length in characters.
pub const MAX_REVIEW_CHARS: usize = 180;

/// Half-star rating between 0.5 and 5.0.
///
/// Stored internally as a count of half stars (1..=10) so equality and
/// ordering are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    /// Validates a client-supplied star value.
    ///
    /// # Errors
    ///
    /// Returns [`TouchlineError::InvalidRequest`] unless `stars` is one of
    /// 0.5, 1.0, … 5.0.
    pub fn new(stars: f64) -> Result<Self, TouchlineError> {
        let halves = stars * 2.0;
        if !halves.is_finite() || halves.fract() != 0.0 || !(1.0..=10.0).contains(&halves) {
            return Err(TouchlineError::InvalidRequest(
                "rating must be between 0.5 and 5 in half steps".to_string(),
            ));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let halves = halves as u8;
        Ok(Self(halves))
    }

    /// Returns the rating in stars.
    #[must_use]
    pub fn stars(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.stars())
    }
}

/// Normalises review text: trims, drops empty input, truncates to
/// [`MAX_REVIEW_CHARS`] characters.
#[must_use]
pub fn review_text(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(trimmed, MAX_REVIEW_CHARS))
}

/// Returns the first `max` characters of `s`.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s.get(..byte_idx).unwrap_or(s).to_string(),
        None => s.to_string(),
    }
}

/// Date the match was watched, bounded between 2000-01-01 and one year
/// past `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchedOn(NaiveDate);

impl WatchedOn {
    /// Parses a `YYYY-MM-DD` date and checks its bounds against `today`.
    ///
    /// # Errors
    ///
    /// Returns [`TouchlineError::InvalidRequest`] on a malformed or
    /// out-of-range date.
    pub fn parse(raw: &str, today: NaiveDate) -> Result<Self, TouchlineError> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            TouchlineError::InvalidRequest("watched date must be formatted YYYY-MM-DD".to_string())
        })?;
        let earliest = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);
        let latest = today + Duration::days(365);
        if date < earliest || date > latest {
            return Err(TouchlineError::InvalidRequest(
                "watched date must be between 2000-01-01 and one year from today".to_string(),
            ));
        }
        Ok(Self(date))
    }

    /// Returns the underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

/// Match lifecycle status as reported by the fixtures provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Not started yet.
    Scheduled,
    /// Currently being played.
    InPlay,
    /// Half time or other break.
    Paused,
    /// Interrupted, may resume.
    Suspended,
    /// Full time.
    Finished,
    /// Moved to a later date.
    Postponed,
    /// Will not be played.
    Cancelled,
}

impl FromStr for MatchStatus {
    type Err = TouchlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" | "TIMED" => Ok(Self::Scheduled),
            "IN_PLAY" | "LIVE" => Ok(Self::InPlay),
            "PAUSED" => Ok(Self::Paused),
            "SUSPENDED" => Ok(Self::Suspended),
            "FINISHED" => Ok(Self::Finished),
            "POSTPONED" => Ok(Self::Postponed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(TouchlineError::Internal(format!(
                "unknown match status: {other}"
            ))),
        }
    }
}

impl MatchStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::InPlay => "IN_PLAY",
            Self::Paused => "PAUSED",
            Self::Suspended => "SUSPENDED",
            Self::Finished => "FINISHED",
            Self::Postponed => "POSTPONED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Read-only match facts shown alongside a log.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MatchSummary {
    /// Match identifier.
    pub match_id: MatchId,
    /// `"Home v Away"`.
    pub title: String,
    /// Competition name, when known.
    pub competition: Option<String>,
    /// Home goals.
    pub home_score: Option<i32>,
    /// Away goals.
    pub away_score: Option<i32>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Scheduled kickoff.
    pub kickoff_at: DateTime<Utc>,
}

/// Builds the display title of a match.
#[must_use]
pub fn match_title(home: &str, away: &str) -> String {
    format!("{home} v {away}")
}

/// Validated input for creating or overwriting a log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatchLog {
    /// Author.
    pub user_id: UserId,
    /// Logged match.
    pub match_id: MatchId,
    /// Optional half-star rating.
    pub rating: Option<Rating>,
    /// Optional, already truncated review.
    pub review: Option<String>,
    /// Optional watched date.
    pub watched_on: Option<NaiveDate>,
    /// Whether this was a rewatch.
    pub is_rewatch: bool,
    /// Whether the review contains spoilers.
    pub has_spoilers: bool,
}

/// A stored match log row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MatchLog {
    /// Log identifier.
    pub id: LogId,
    /// Author.
    pub user_id: UserId,
    /// Logged match.
    pub match_id: MatchId,
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
    /// First creation time.
    pub created_at: DateTime<Utc>,
    /// Last upsert time.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn rating_rejects_off_grid_and_out_of_range() {
        for stars in [0.0, 0.3, 5.5, 3.3, -1.0, f64::NAN] {
            assert!(Rating::new(stars).is_err(), "{stars} should be rejected");
        }
    }

    #[test]
    fn rating_accepts_half_steps() {
        for stars in [0.5, 1.0, 4.5, 5.0] {
            let Ok(rating) = Rating::new(stars) else {
                panic!("{stars} should be accepted");
            };
            assert!((rating.stars() - stars).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn review_is_trimmed_and_truncated() {
        assert_eq!(review_text(None), None);
        assert_eq!(review_text(Some("   ")), None);
        assert_eq!(review_text(Some("  Great game ")).as_deref(), Some("Great game"));

        let long = "é".repeat(200);
        let Some(stored) = review_text(Some(&long)) else {
            panic!("long review dropped");
        };
        assert_eq!(stored.chars().count(), MAX_REVIEW_CHARS);
    }

    #[test]
    fn watched_on_bounds() {
        let Some(today) = NaiveDate::from_ymd_opt(2026, 10, 19) else {
            panic!("valid date");
        };
        assert!(WatchedOn::parse("2000-01-01", today).is_ok());
        assert!(WatchedOn::parse("2027-10-19", today).is_ok());
        assert!(WatchedOn::parse("1999-12-31", today).is_err());
        assert!(WatchedOn::parse("2027-10-20", today).is_err());
        assert!(WatchedOn::parse("19/10/2026", today).is_err());
    }

    #[test]
    fn match_status_round_trips_through_storage_form() {
        for status in [
            MatchStatus::Scheduled,
            MatchStatus::InPlay,
            MatchStatus::Paused,
            MatchStatus::Suspended,
            MatchStatus::Finished,
            MatchStatus::Postponed,
            MatchStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<MatchStatus>().ok(), Some(status));
        }
    }

    #[test]
    fn title_joins_teams() {
        assert_eq!(match_title("Arsenal", "Spurs"), "Arsenal v Spurs");
    }
}
