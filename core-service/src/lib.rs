//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media backend, HTTP,
//! clock) into the shared core: the favorites store, the catalog client and
//! the playback controller. Hosts build an [`AppConfig`], call
//! [`CoreService::bootstrap`] once at startup and hold the returned service
//! for the lifetime of the app.

pub mod error;
pub mod favorites;
pub mod search;

pub use error::{CoreError, Result};
pub use favorites::FavoritesService;
pub use search::SearchSession;

use std::sync::Arc;

use bridge_traits::{http::HttpClient, playback::MediaBackend, Clock};
use core_library::db::{create_pool, DatabaseConfig};
use core_library::SqliteFavoritesRepository;
use core_playback::{PlaybackConfig, PlaybackController, PlaybackError};
use core_runtime::config::AppConfig;
use core_runtime::events::EventBus;
use provider_itunes::{CatalogSearch, ItunesCatalogClient};
use tracing::{info, warn};

/// Aggregated handle to all bridge dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub media_backend: Arc<dyn MediaBackend>,
    pub http_client: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        media_backend: Arc<dyn MediaBackend>,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            media_backend,
            http_client,
            clock,
        }
    }
}

impl From<&AppConfig> for CoreDependencies {
    fn from(config: &AppConfig) -> Self {
        Self {
            media_backend: Arc::clone(&config.media_backend),
            http_client: Arc::clone(&config.http_client),
            clock: Arc::clone(&config.clock),
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    config: Arc<AppConfig>,
    events: EventBus,
    catalog: Arc<dyn CatalogSearch>,
    favorites: FavoritesService,
    playback: PlaybackController,
}

impl CoreService {
    /// Validate `config`, open the favorites store and start the playback
    /// controller.
    ///
    /// An unavailable audio backend is not fatal: it is logged, announced on
    /// the event bus and every playback command becomes a no-op. Search and
    /// favorites keep working.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Runtime`] for invalid configuration
    /// - [`CoreError::Library`] if the database cannot be opened
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let deps = Arc::new(CoreDependencies::from(&config));
        let events = EventBus::new(config.event_buffer_size);

        let database = match &config.database_path {
            Some(path) => DatabaseConfig::new(path),
            None => DatabaseConfig::in_memory(),
        };
        let pool = create_pool(database).await?;
        let repository = Arc::new(SqliteFavoritesRepository::new(pool, Arc::clone(&deps.clock)));
        let favorites = FavoritesService::new(repository, Arc::clone(&deps.clock), events.clone());

        let catalog: Arc<dyn CatalogSearch> = Arc::new(ItunesCatalogClient::with_base_url(
            Arc::clone(&deps.http_client),
            config.catalog_base_url.clone(),
        ));

        let playback_config = PlaybackConfig::from(&config);
        playback_config.validate()?;
        let playback = PlaybackController::new(
            Arc::clone(&deps.media_backend),
            playback_config,
            events.clone(),
        );
        match playback.initialize().await {
            Ok(()) => {}
            Err(PlaybackError::BackendUnavailable(reason)) => {
                warn!(%reason, "Continuing without audio output");
            }
            Err(other) => return Err(other.into()),
        }

        info!(
            persistent = config.database_path.is_some(),
            audio = playback.is_available(),
            "Core service ready"
        );

        Ok(Self {
            deps,
            config: Arc::new(config),
            events,
            catalog,
            favorites,
            playback,
        })
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn favorites(&self) -> &FavoritesService {
        &self.favorites
    }

    /// Fresh view-state for a search screen. Each screen owns its own.
    pub fn search_session(&self) -> SearchSession {
        SearchSession::new(
            Arc::clone(&self.catalog),
            self.events.clone(),
            self.config.search_limit,
        )
    }
}
