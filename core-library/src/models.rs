//! Domain models for catalog tracks and saved favorites
//!
//! [`Track`] decodes directly from iTunes Search API results. [`Favorite`] is a
//! denormalized snapshot of a track taken when the user saved it; later catalog
//! changes never propagate into it.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// How far back [`FavoriteFilter::Recent`] looks.
pub const RECENT_WINDOW_DAYS: i64 = 7;

// =============================================================================
// ID Types
// =============================================================================

/// Catalog identifier for a track
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TrackId(pub i64);

impl TrackId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Track
// =============================================================================

/// A catalog track.
///
/// Equality and hashing use only [`id`](Track::id): the catalog can return
/// slightly different metadata for the same track across searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "trackId")]
    pub id: TrackId,
    #[serde(rename = "trackName")]
    pub name: String,
    pub artist_name: String,
    #[serde(rename = "collectionName", default)]
    pub album_name: Option<String>,
    /// 100x100 artwork URL
    #[serde(rename = "artworkUrl100", default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(rename = "trackTimeMillis", default)]
    pub duration_ms: Option<i64>,
    /// RFC 3339 timestamp as returned by the catalog
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(rename = "primaryGenreName", default)]
    pub genre: Option<String>,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Track {
    pub fn new(id: i64, name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: TrackId(id),
            name: name.into(),
            artist_name: artist.into(),
            album_name: None,
            artwork_url: None,
            preview_url: None,
            duration_ms: None,
            release_date: None,
            genre: None,
        }
    }

    pub fn with_preview_url(mut self, url: impl Into<String>) -> Self {
        self.preview_url = Some(url.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album_name = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// The preview URL, if present and not blank.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn has_preview(&self) -> bool {
        self.preview_url().is_some()
    }

    /// Artwork upscaled to 600x600 for detail screens.
    pub fn artwork_url_large(&self) -> Option<String> {
        self.artwork_url
            .as_ref()
            .map(|url| url.replace("100x100", "600x600"))
    }

    /// Full track length as `m:ss`, or `"Unknown"`.
    pub fn duration_label(&self) -> String {
        match self.duration_ms {
            Some(ms) if ms > 0 => {
                let total_secs = ms / 1000;
                format!("{}:{:02}", total_secs / 60, total_secs % 60)
            }
            _ => "Unknown".to_string(),
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        let raw = self.release_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|date| date.year())
    }

    /// Validate fields required before persisting a snapshot.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Track name cannot be empty".to_string());
        }
        if self.artist_name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }
        if matches!(self.duration_ms, Some(ms) if ms < 0) {
            return Err("Track duration cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Remove tracks whose id was already seen, keeping the first occurrence.
pub fn dedup_by_id(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::with_capacity(tracks.len());
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.id))
        .collect()
}

// =============================================================================
// Favorite
// =============================================================================

/// A saved track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub track_id: TrackId,
    pub name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub artwork_url: Option<String>,
    pub preview_url: Option<String>,
    pub duration_ms: Option<i64>,
    pub release_date: Option<String>,
    pub genre: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    /// Snapshot `track` as of `added_at`.
    pub fn from_track(track: &Track, added_at: DateTime<Utc>) -> Self {
        Self {
            track_id: track.id,
            name: track.name.clone(),
            artist_name: track.artist_name.clone(),
            album_name: track.album_name.clone(),
            artwork_url: track.artwork_url.clone(),
            preview_url: track.preview_url.clone(),
            duration_ms: track.duration_ms,
            release_date: track.release_date.clone(),
            genre: track.genre.clone(),
            added_at,
        }
    }

    /// Rebuild a playable track from the snapshot.
    pub fn to_track(&self) -> Track {
        Track {
            id: self.track_id,
            name: self.name.clone(),
            artist_name: self.artist_name.clone(),
            album_name: self.album_name.clone(),
            artwork_url: self.artwork_url.clone(),
            preview_url: self.preview_url.clone(),
            duration_ms: self.duration_ms,
            release_date: self.release_date.clone(),
            genre: self.genre.clone(),
        }
    }
}

/// Category filter for the favorites screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FavoriteFilter {
    All,
    /// Added within the last [`RECENT_WINDOW_DAYS`] days
    Recent,
    /// Exact primary-genre match
    Genre(String),
}

impl FavoriteFilter {
    pub fn label(&self) -> &str {
        match self {
            FavoriteFilter::All => "All",
            FavoriteFilter::Recent => "Recent",
            FavoriteFilter::Genre(genre) => genre,
        }
    }

    pub fn matches(&self, favorite: &Favorite, now: DateTime<Utc>) -> bool {
        match self {
            FavoriteFilter::All => true,
            FavoriteFilter::Recent => favorite.added_at >= now - Duration::days(RECENT_WINDOW_DAYS),
            FavoriteFilter::Genre(genre) => favorite.genre.as_deref() == Some(genre.as_str()),
        }
    }

    /// Keep the favorites matching this filter, preserving order.
    pub fn apply(&self, favorites: Vec<Favorite>, now: DateTime<Utc>) -> Vec<Favorite> {
        favorites
            .into_iter()
            .filter(|favorite| self.matches(favorite, now))
            .collect()
    }

    /// `All`, `Recent`, then one filter per distinct genre in alphabetical order.
    pub fn available_filters(favorites: &[Favorite]) -> Vec<FavoriteFilter> {
        let genres: BTreeSet<&str> = favorites
            .iter()
            .filter_map(|favorite| favorite.genre.as_deref())
            .filter(|genre| !genre.trim().is_empty())
            .collect();

        [FavoriteFilter::All, FavoriteFilter::Recent]
            .into_iter()
            .chain(genres.into_iter().map(|g| FavoriteFilter::Genre(g.to_string())))
            .collect()
    }
}

impl fmt::Display for FavoriteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
