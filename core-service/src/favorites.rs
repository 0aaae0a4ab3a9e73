//! Favorites service.
//!
//! Thin layer over a [`FavoritesRepository`] that stamps filters with the
//! current time and announces changes on the event bus. Persistence errors
//! are returned to the caller and never affect playback.

use bridge_traits::Clock;
use core_library::{Favorite, FavoriteFilter, FavoritesRepository, Track, TrackId};
use core_runtime::events::{CoreEvent, EventBus, FavoritesEvent};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::Result;

#[derive(Clone)]
pub struct FavoritesService {
    repository: Arc<dyn FavoritesRepository>,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl FavoritesService {
    pub fn new(
        repository: Arc<dyn FavoritesRepository>,
        clock: Arc<dyn Clock>,
        events: EventBus,
    ) -> Self {
        Self {
            repository,
            clock,
            events,
        }
    }

    /// Save a snapshot of `track`. Saving twice keeps the first snapshot.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn add(&self, track: &Track) -> Result<Favorite> {
        let favorite = self.repository.add(track).await?;
        self.emit(FavoritesEvent::Added {
            track_id: track.id.value(),
        });
        Ok(favorite)
    }

    /// Returns `true` if the track was saved.
    #[instrument(skip(self))]
    pub async fn remove(&self, track_id: TrackId) -> Result<bool> {
        let removed = self.repository.remove(track_id).await?;
        if removed {
            self.emit(FavoritesEvent::Removed {
                track_id: track_id.value(),
            });
        }
        Ok(removed)
    }

    /// Flip membership, returning whether the track is now a favorite.
    pub async fn toggle(&self, track: &Track) -> Result<bool> {
        if self.repository.contains(track.id).await? {
            self.remove(track.id).await?;
            Ok(false)
        } else {
            self.add(track).await?;
            Ok(true)
        }
    }

    pub async fn contains(&self, track_id: TrackId) -> Result<bool> {
        Ok(self.repository.contains(track_id).await?)
    }

    /// Newest first.
    pub async fn list_all(&self) -> Result<Vec<Favorite>> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn list_filtered(&self, filter: &FavoriteFilter) -> Result<Vec<Favorite>> {
        let favorites = self.repository.list_all().await?;
        let filtered = filter.apply(favorites, self.clock.now());
        debug!(filter = %filter, count = filtered.len(), "Favorites filtered");
        Ok(filtered)
    }

    /// `All`, `Recent`, then one genre filter per distinct saved genre.
    pub async fn available_filters(&self) -> Result<Vec<FavoriteFilter>> {
        let favorites = self.repository.list_all().await?;
        Ok(FavoriteFilter::available_filters(&favorites))
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.repository.count().await?)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64> {
        let removed = self.repository.clear().await?;
        info!(removed, "Favorites cleared");
        self.emit(FavoritesEvent::Cleared { removed });
        Ok(removed)
    }

    fn emit(&self, event: FavoritesEvent) {
        self.events.emit(CoreEvent::Favorites(event)).ok();
    }
}
