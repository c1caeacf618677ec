//! Data model for tracked platforms and games
//!
//! Field names follow the catalog API's JSON so the same structs decode
//! remote responses and encode persisted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gaming platform (console, handheld, PC...) tracked by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

/// A game returned by the catalog, with its per-platform release dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub release_dates: Vec<ReleaseDate>,
    pub cover: Option<Image>,
    pub summary: Option<String>,
    pub websites: Option<Vec<Website>>,
    pub screenshots: Option<Vec<Image>>,
}

impl Game {
    /// Sort key for tracked games: the numeric date of the first release
    /// entry, 0 when there is none.
    pub fn release_sort_key(&self) -> i64 {
        self.release_dates
            .first()
            .and_then(|release| release.date)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDate {
    pub category: Option<i64>,
    /// Milliseconds since the Unix epoch
    pub date: Option<i64>,
    pub human: Option<String>,
    pub m: Option<i64>,
    pub platform: Option<i64>,
    pub region: Option<i64>,
    pub y: Option<i64>,
}

impl ReleaseDate {
    /// The release timestamp as a UTC date-time, if the entry has one
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

/// Image reference. Only `cloudinary_id` is needed to build a display URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub cloudinary_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub category: i64,
    pub url: String,
}

/// Persisted link between a game and the platform it was added under.
///
/// Encoded as a two-element `[platform_id, game_id]` JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct TrackedGame {
    pub platform_id: i64,
    pub game_id: i64,
}

impl From<(i64, i64)> for TrackedGame {
    fn from((platform_id, game_id): (i64, i64)) -> Self {
        Self {
            platform_id,
            game_id,
        }
    }
}

impl From<TrackedGame> for (i64, i64) {
    fn from(tracked: TrackedGame) -> Self {
        (tracked.platform_id, tracked.game_id)
    }
}

/// Label/value pair consumed by selection widgets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption<T> {
    pub label: String,
    pub value: T,
}
