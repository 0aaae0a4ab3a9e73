//! Favorites repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Favorite, Track, TrackId};
use async_trait::async_trait;
use bridge_traits::Clock;
use chrono::{DateTime, Utc};
use sqlx::{query_as, FromRow, SqlitePool};
use std::sync::Arc;
use tracing::debug;

/// Favorites repository interface
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Save a snapshot of `track`.
    ///
    /// Idempotent: saving an already-saved track returns the existing favorite
    /// untouched, original snapshot and timestamp included.
    async fn add(&self, track: &Track) -> Result<Favorite>;

    /// Delete a favorite.
    ///
    /// # Returns
    /// - `Ok(true)` if it was deleted
    /// - `Ok(false)` if it was not saved
    async fn remove(&self, track_id: TrackId) -> Result<bool>;

    /// All favorites, most recently added first.
    async fn list_all(&self) -> Result<Vec<Favorite>>;

    async fn find(&self, track_id: TrackId) -> Result<Option<Favorite>>;

    async fn contains(&self, track_id: TrackId) -> Result<bool>;

    /// Delete every favorite, returning how many were removed.
    async fn clear(&self) -> Result<u64>;

    async fn count(&self) -> Result<i64>;
}

#[derive(Debug, FromRow)]
struct FavoriteRow {
    track_id: TrackId,
    name: String,
    artist_name: String,
    album_name: Option<String>,
    artwork_url: Option<String>,
    preview_url: Option<String>,
    duration_ms: Option<i64>,
    release_date: Option<String>,
    genre: Option<String>,
    added_at: i64,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = LibraryError;

    fn try_from(row: FavoriteRow) -> Result<Self> {
        let added_at = DateTime::<Utc>::from_timestamp_millis(row.added_at).ok_or_else(|| {
            LibraryError::invalid("added_at", format!("timestamp {} out of range", row.added_at))
        })?;

        Ok(Favorite {
            track_id: row.track_id,
            name: row.name,
            artist_name: row.artist_name,
            album_name: row.album_name,
            artwork_url: row.artwork_url,
            preview_url: row.preview_url,
            duration_ms: row.duration_ms,
            release_date: row.release_date,
            genre: row.genre,
            added_at,
        })
    }
}

const SELECT_FAVORITE: &str = r#"
    SELECT track_id, name, artist_name, album_name, artwork_url, preview_url,
           duration_ms, release_date, genre, added_at
    FROM favorites
"#;

/// SQLite implementation of [`FavoritesRepository`]
pub struct SqliteFavoritesRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteFavoritesRepository {
    /// `clock` stamps `added_at` on new favorites.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl FavoritesRepository for SqliteFavoritesRepository {
    async fn add(&self, track: &Track) -> Result<Favorite> {
        track
            .validate()
            .map_err(|msg| LibraryError::invalid("track", msg))?;

        let favorite = Favorite::from_track(track, self.clock.now());

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO favorites (
                track_id, name, artist_name, album_name, artwork_url, preview_url,
                duration_ms, release_date, genre, added_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(favorite.track_id)
        .bind(&favorite.name)
        .bind(&favorite.artist_name)
        .bind(&favorite.album_name)
        .bind(&favorite.artwork_url)
        .bind(&favorite.preview_url)
        .bind(favorite.duration_ms)
        .bind(&favorite.release_date)
        .bind(&favorite.genre)
        .bind(favorite.added_at.timestamp_millis())
        .execute(&self.pool)
        .await?
        .rows_affected();

        debug!(track_id = %track.id, inserted = inserted > 0, "Favorite saved");

        self.find(track.id)
            .await?
            .ok_or_else(|| LibraryError::NotFound {
                entity_type: "Favorite".to_string(),
                id: track.id.to_string(),
            })
    }

    async fn remove(&self, track_id: TrackId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE track_id = ?")
            .bind(track_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Favorite>> {
        let sql = format!("{} ORDER BY added_at DESC, id DESC", SELECT_FAVORITE);
        let rows = query_as::<_, FavoriteRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Favorite::try_from).collect()
    }

    async fn find(&self, track_id: TrackId) -> Result<Option<Favorite>> {
        let sql = format!("{} WHERE track_id = ?", SELECT_FAVORITE);
        let row = query_as::<_, FavoriteRow>(&sql)
            .bind(track_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Favorite::try_from).transpose()
    }

    async fn contains(&self, track_id: TrackId) -> Result<bool> {
        let (matches,): (i64,) = query_as("SELECT COUNT(*) FROM favorites WHERE track_id = ?")
            .bind(track_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(matches > 0)
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM favorites")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM favorites")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
