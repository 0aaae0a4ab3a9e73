//! # Application Configuration
//!
//! Builder-based configuration for the Moodify core.
//!
//! ## Overview
//!
//! [`AppConfig`] holds every host capability and tunable the core needs. The
//! builder validates eagerly so a misconfigured host fails at startup with an
//! actionable message rather than on the first user action.
//!
//! ## Required Capabilities
//!
//! - `MediaBackend` - audio output for track previews
//! - `HttpClient` - catalog search requests (desktop default: `bridge_desktop::ReqwestHttpClient`)
//!
//! ## Optional Settings
//!
//! | Setting | Default |
//! |---------|---------|
//! | `database_path` | in-memory favorites store |
//! | `catalog_base_url` | [`DEFAULT_CATALOG_URL`] |
//! | `search_limit` | [`DEFAULT_SEARCH_LIMIT`] (max [`MAX_SEARCH_LIMIT`]) |
//! | `progress_interval` | [`DEFAULT_PROGRESS_INTERVAL`] |
//! | `event_buffer_size` | [`DEFAULT_EVENT_BUFFER_SIZE`] |
//! | `clock` | `SystemClock` |
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::AppConfig;
//! use std::sync::Arc;
//!
//! let config = AppConfig::builder()
//!     .media_backend(Arc::new(MyAudioBackend::new()))
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .database_path("/path/to/favorites.db")
//!     .search_limit(50)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
pub use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{Clock, HttpClient, MediaBackend, SystemClock};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// iTunes Search API endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://itunes.apple.com/search";

/// Number of tracks requested per search unless configured otherwise.
pub const DEFAULT_SEARCH_LIMIT: u32 = 25;

/// Upper bound accepted by the catalog for `limit`.
pub const MAX_SEARCH_LIMIT: u32 = 200;

/// Sampling period for playback position (twice per second).
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Longest progress interval that still reads as live progress.
const MAX_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for the Moodify core.
///
/// Construct with [`AppConfig::builder`].
#[derive(Clone)]
pub struct AppConfig {
    /// Audio output driven exclusively by the playback controller
    pub media_backend: Arc<dyn MediaBackend>,

    /// HTTP client used by the catalog search provider
    pub http_client: Arc<dyn HttpClient>,

    /// SQLite database file for favorites; `None` keeps favorites in memory
    pub database_path: Option<PathBuf>,

    pub catalog_base_url: String,

    /// Default number of results per search
    pub search_limit: u32,

    /// How often the playback position is sampled while playing
    pub progress_interval: Duration,

    /// Capacity of the core event bus
    pub event_buffer_size: usize,

    /// Time source for favorite timestamps and recency filters
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("media_backend", &"MediaBackend { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("database_path", &self.database_path)
            .field("catalog_base_url", &self.catalog_base_url)
            .field("search_limit", &self.search_limit)
            .field("progress_interval", &self.progress_interval)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validates value ranges.
    ///
    /// Capabilities are checked by the builder; this only checks settings, so
    /// it is also safe to call after mutating a built config.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config(
                    "Database path cannot be empty. Omit it to keep favorites in memory."
                        .to_string(),
                ));
            }
        }

        let base = self.catalog_base_url.trim();
        if base.is_empty() {
            return Err(Error::Config("Catalog base URL cannot be empty".to_string()));
        }
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(Error::Config(format!(
                "Catalog base URL must be http(s), got '{}'",
                base
            )));
        }

        if self.search_limit == 0 || self.search_limit > MAX_SEARCH_LIMIT {
            return Err(Error::Config(format!(
                "Search limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT, self.search_limit
            )));
        }

        if self.progress_interval.is_zero() {
            return Err(Error::Config(
                "Progress interval must be greater than 0ms".to_string(),
            ));
        }
        if self.progress_interval > MAX_PROGRESS_INTERVAL {
            return Err(Error::Config(format!(
                "Progress interval exceeds maximum of {}s",
                MAX_PROGRESS_INTERVAL.as_secs()
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`AppConfig`].
#[derive(Default)]
pub struct AppConfigBuilder {
    media_backend: Option<Arc<dyn MediaBackend>>,
    http_client: Option<Arc<dyn HttpClient>>,
    database_path: Option<PathBuf>,
    catalog_base_url: Option<String>,
    search_limit: Option<u32>,
    progress_interval: Option<Duration>,
    event_buffer_size: Option<usize>,
    clock: Option<Arc<dyn Clock>>,
}

impl AppConfigBuilder {
    pub fn media_backend(mut self, backend: Arc<dyn MediaBackend>) -> Self {
        self.media_backend = Some(backend);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Persist favorites to a SQLite file. The file is created if missing.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Point catalog searches at a different endpoint (useful for staging or tests).
    pub fn catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_base_url = Some(url.into());
        self
    }

    pub fn search_limit(mut self, limit: u32) -> Self {
        self.search_limit = Some(limit);
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when the media backend or HTTP client is absent
    /// - [`Error::Config`] when a setting is out of range
    pub fn build(self) -> Result<AppConfig> {
        let media_backend = self.media_backend.ok_or_else(|| {
            Error::missing(
                "MediaBackend",
                "A MediaBackend is required to play track previews. \
                 Desktop: inject an audio backend for the host's output device. \
                 Mobile: wrap the platform player (AVPlayer/ExoPlayer).",
            )
        })?;

        let http_client = self.http_client.ok_or_else(|| {
            Error::missing(
                "HttpClient",
                "An HttpClient is required for catalog search. \
                 Desktop: use bridge_desktop::ReqwestHttpClient.",
            )
        })?;

        let config = AppConfig {
            media_backend,
            http_client,
            database_path: self.database_path,
            catalog_base_url: self
                .catalog_base_url
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            search_limit: self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            progress_interval: self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        BackendEventSink, HttpRequest, HttpResponse, PlaybackRequest, PlaybackSessionId,
    };
    use mockall::mock;

    mock! {
        Backend {}

        #[async_trait]
        impl MediaBackend for Backend {
            async fn activate(&self) -> BridgeResult<()>;
            async fn load(
                &self,
                request: PlaybackRequest,
                events: Arc<dyn BackendEventSink>,
            ) -> BridgeResult<PlaybackSessionId>;
            async fn play(&self, session: PlaybackSessionId) -> BridgeResult<()>;
            async fn pause(&self, session: PlaybackSessionId) -> BridgeResult<()>;
            async fn seek(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()>;
            async fn position(&self, session: PlaybackSessionId) -> BridgeResult<Duration>;
            async fn resolve_duration(&self, session: PlaybackSessionId) -> BridgeResult<Option<Duration>>;
            async fn unload(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        }
    }

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn complete_builder() -> AppConfigBuilder {
        AppConfig::builder()
            .media_backend(Arc::new(MockBackend::new()))
            .http_client(Arc::new(MockHttp::new()))
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.database_path, None);
        assert_eq!(config.catalog_base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.search_limit, 25);
        assert_eq!(config.progress_interval, Duration::from_millis(500));
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_requires_media_backend() {
        let result = AppConfig::builder()
            .http_client(Arc::new(MockHttp::new()))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "MediaBackend")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_requires_http_client() {
        let result = AppConfig::builder()
            .media_backend(Arc::new(MockBackend::new()))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "HttpClient");
                assert!(message.contains("ReqwestHttpClient"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_search_limit_bounds() {
        assert!(complete_builder().search_limit(200).build().is_ok());
        assert!(matches!(
            complete_builder().search_limit(0).build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            complete_builder().search_limit(201).build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_zero_progress_interval() {
        let result = complete_builder()
            .progress_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_bad_catalog_url() {
        assert!(matches!(
            complete_builder().catalog_base_url("  ").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            complete_builder().catalog_base_url("ftp://example.com").build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_empty_database_path() {
        let result = complete_builder().database_path("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_capabilities() {
        let config = complete_builder()
            .database_path("/tmp/favorites.db")
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);

        assert!(rendered.contains("MediaBackend { ... }"));
        assert!(rendered.contains("favorites.db"));
    }
}
