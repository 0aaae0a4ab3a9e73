//! iTunes Search API client

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_library::{dedup_by_id, Track};
use core_runtime::config::{DEFAULT_CATALOG_URL, MAX_SEARCH_LIMIT};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::mood::Mood;
use crate::types::SearchResponse;

/// Catalog search seam.
///
/// Callers surface failures inline and keep their previous results; nothing
/// here touches playback state.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search songs matching `term`, returning at most `limit` unique tracks.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidQuery`] for a blank term or `limit` outside `1..=200`
    /// - [`CatalogError::HttpError`] for a non-2xx response
    /// - [`CatalogError::DecodeError`] for a malformed payload
    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Track>>;

    /// Search using a mood preset's term.
    async fn search_mood(&self, mood: Mood, limit: u32) -> Result<Vec<Track>> {
        self.search(mood.search_term(), limit).await
    }
}

/// iTunes Search API client.
///
/// # Example
///
/// ```ignore
/// use provider_itunes::{CatalogSearch, ItunesCatalogClient, Mood};
///
/// let client = ItunesCatalogClient::new(http_client);
/// let tracks = client.search_mood(Mood::Chill, 25).await?;
/// ```
pub struct ItunesCatalogClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl ItunesCatalogClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http_client, DEFAULT_CATALOG_URL)
    }

    pub fn with_base_url(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Build the request URL, validating the query first.
    fn search_url(&self, term: &str, limit: u32) -> Result<String> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CatalogError::InvalidQuery(
                "search term cannot be empty".to_string(),
            ));
        }
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(CatalogError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT, limit
            )));
        }

        Ok(format!(
            "{}?term={}&media=music&entity=song&limit={}",
            self.base_url,
            urlencoding::encode(term),
            limit
        ))
    }
}

#[async_trait]
impl CatalogSearch for ItunesCatalogClient {
    #[instrument(skip(self))]
    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Track>> {
        let url = self.search_url(term, limit)?;
        let request = HttpRequest::get(url).header("Accept", "application/json");

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "Catalog search returned an error status");
            return Err(CatalogError::HttpError {
                status: response.status,
            });
        }

        let payload: SearchResponse = serde_json::from_slice(&response.body)
            .map_err(|e| CatalogError::DecodeError(e.to_string()))?;

        let tracks = dedup_by_id(payload.results);
        debug!(
            reported = payload.result_count,
            unique = tracks.len(),
            "Catalog search completed"
        );

        Ok(tracks)
    }
}
