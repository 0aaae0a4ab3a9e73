//! Search screen view-state.

use core_library::Track;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use provider_itunes::{CatalogSearch, Mood};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{CoreError, Result};

/// Results, loading flag and inline message for one search screen.
///
/// A failed search never clears the previous results; it only sets
/// [`error_message`](SearchSession::error_message). Searching never touches
/// playback.
pub struct SearchSession {
    catalog: Arc<dyn CatalogSearch>,
    events: EventBus,
    limit: u32,
    results: Vec<Track>,
    is_loading: bool,
    error_message: Option<String>,
    selected_mood: Option<Mood>,
}

impl SearchSession {
    pub fn new(catalog: Arc<dyn CatalogSearch>, events: EventBus, limit: u32) -> Self {
        Self {
            catalog,
            events,
            limit,
            results: Vec::new(),
            is_loading: false,
            error_message: None,
            selected_mood: None,
        }
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Failure text, or the "no tracks found" notice after an empty search.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn selected_mood(&self) -> Option<Mood> {
        self.selected_mood
    }

    /// Free-text search. A blank term clears the screen without a request.
    #[instrument(skip(self))]
    pub async fn search(&mut self, term: &str) -> Result<()> {
        let term = term.trim();
        self.selected_mood = None;
        if term.is_empty() {
            self.clear();
            return Ok(());
        }

        let empty_notice = format!("No tracks found for '{}'", term);
        self.run(term, empty_notice).await
    }

    /// Search with a mood preset's term.
    #[instrument(skip(self))]
    pub async fn search_mood(&mut self, mood: Mood) -> Result<()> {
        self.selected_mood = Some(mood);
        let empty_notice = format!("No tracks found for {} mood", mood);
        self.run(mood.search_term(), empty_notice).await
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.is_loading = false;
        self.error_message = None;
        self.selected_mood = None;
    }

    async fn run(&mut self, term: &str, empty_notice: String) -> Result<()> {
        self.is_loading = true;
        self.error_message = None;

        let outcome = match self.selected_mood {
            Some(mood) => self.catalog.search_mood(mood, self.limit).await,
            None => self.catalog.search(term, self.limit).await,
        };
        self.is_loading = false;

        match outcome {
            Ok(tracks) => {
                debug!(term, count = tracks.len(), "Search results updated");
                self.emit(CatalogEvent::SearchCompleted {
                    term: term.to_string(),
                    result_count: tracks.len(),
                });
                if tracks.is_empty() {
                    self.error_message = Some(empty_notice);
                }
                self.results = tracks;
                Ok(())
            }
            Err(e) => {
                let error = CoreError::from(e);
                warn!(term, error = %error, "Search failed; keeping previous results");
                self.error_message = Some(error.user_message());
                self.emit(CatalogEvent::SearchFailed {
                    term: term.to_string(),
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    fn emit(&self, event: CatalogEvent) {
        self.events.emit(CoreEvent::Catalog(event)).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::eq;
    use provider_itunes::CatalogError;

    mock! {
        Catalog {}

        #[async_trait]
        impl CatalogSearch for Catalog {
            async fn search(&self, term: &str, limit: u32) -> provider_itunes::Result<Vec<Track>>;
            async fn search_mood(&self, mood: Mood, limit: u32) -> provider_itunes::Result<Vec<Track>>;
        }
    }

    fn tracks(ids: &[i64]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(*id, format!("Song {}", id), "Artist"))
            .collect()
    }

    fn session(catalog: MockCatalog) -> SearchSession {
        SearchSession::new(Arc::new(catalog), EventBus::new(16), 25)
    }

    #[tokio::test]
    async fn test_search_replaces_results() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search()
            .withf(|term, limit| term == "lofi" && *limit == 25)
            .times(1)
            .returning(|_, _| Ok(tracks(&[1, 2])));
        let mut search = session(catalog);

        search.search("  lofi ").await.unwrap();

        assert_eq!(search.results().len(), 2);
        assert!(!search.is_loading());
        assert_eq!(search.error_message(), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_results() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search()
            .withf(|term, _| term == "jazz")
            .returning(|_, _| Ok(tracks(&[1, 2, 3])));
        catalog
            .expect_search()
            .withf(|term, _| term == "rock")
            .returning(|_, _| Err(CatalogError::HttpError { status: 500 }));
        let mut search = session(catalog);

        search.search("jazz").await.unwrap();
        let result = search.search("rock").await;

        assert!(matches!(result, Err(CoreError::Catalog(_))));
        assert_eq!(search.results().len(), 3);
        assert_eq!(search.error_message(), Some("Search failed (HTTP 500)"));
    }

    #[tokio::test]
    async fn test_empty_results_set_notice() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search().returning(|_, _| Ok(Vec::new()));
        catalog
            .expect_search_mood()
            .with(eq(Mood::Sad), eq(25))
            .returning(|_, _| Ok(Vec::new()));
        let mut search = session(catalog);

        search.search("zzzz").await.unwrap();
        assert_eq!(search.error_message(), Some("No tracks found for 'zzzz'"));

        search.search_mood(Mood::Sad).await.unwrap();
        assert_eq!(search.error_message(), Some("No tracks found for Sad mood"));
        assert_eq!(search.selected_mood(), Some(Mood::Sad));
    }

    #[tokio::test]
    async fn test_blank_term_clears_without_request() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_mood()
            .returning(|_, _| Ok(tracks(&[4])));
        catalog.expect_search().times(0);
        let mut search = session(catalog);

        search.search_mood(Mood::Chill).await.unwrap();
        search.search("   ").await.unwrap();

        assert!(search.results().is_empty());
        assert_eq!(search.selected_mood(), None);
        assert_eq!(search.error_message(), None);
    }

    #[tokio::test]
    async fn test_events_report_outcome() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search()
            .returning(|_, _| Err(CatalogError::DecodeError("bad json".to_string())));
        let events = EventBus::new(16);
        let mut rx = events.subscribe();
        let mut search = SearchSession::new(Arc::new(catalog), events, 10);

        assert!(search.search("pop").await.is_err());

        match rx.try_recv().unwrap() {
            CoreEvent::Catalog(CatalogEvent::SearchFailed { term, .. }) => assert_eq!(term, "pop"),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
