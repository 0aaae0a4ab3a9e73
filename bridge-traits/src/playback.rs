//! Media backend bridge trait and supporting session types.
//!
//! The playback controller never touches platform audio APIs directly. Hosts
//! provide a [`MediaBackend`] that can stream a preview URL, report elapsed
//! position, seek, and notify when a stream reaches its natural end. The
//! controller is the only caller of this trait and owns every session it
//! creates.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for playback sessions managed by a media backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaybackSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata associated with a playback request. Backends may use this to
/// enrich platform now-playing surfaces.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMetadata {
    /// Opaque track identifier.
    pub track_id: Option<String>,
    /// Display title for the track.
    pub title: Option<String>,
    /// Display artist string.
    pub artist: Option<String>,
    /// Album or collection name.
    pub album: Option<String>,
    /// Arbitrary extra fields (e.g., artwork URI, genre).
    pub extra: HashMap<String, String>,
}

/// Request describing the session a backend should provision.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    /// Remote preview URL to stream.
    pub url: String,
    /// Optional metadata surfaced to the host.
    pub metadata: PlaybackMetadata,
}

impl PlaybackRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: PlaybackMetadata::default(),
        }
    }

    /// Attach metadata to the request.
    pub fn with_metadata(mut self, metadata: PlaybackMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Notifications a backend raises for a session outside of any command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// The stream reached its natural end.
    Finished { session: PlaybackSessionId },
    /// The stream failed after it was loaded.
    Failed {
        session: PlaybackSessionId,
        message: String,
    },
}

impl BackendEvent {
    pub fn session(&self) -> PlaybackSessionId {
        match self {
            BackendEvent::Finished { session } | BackendEvent::Failed { session, .. } => *session,
        }
    }
}

/// Receiver for [`BackendEvent`]s.
///
/// Implementations must be cheap and non-blocking: backends may call
/// [`notify`](BackendEventSink::notify) from an audio or OS callback thread.
pub trait BackendEventSink: Send + Sync {
    fn notify(&self, event: BackendEvent);
}

/// Platform media backend.
///
/// One backend may host several sessions over its lifetime, but the playback
/// controller guarantees at most one is loaded at any instant.
#[async_trait::async_trait]
pub trait MediaBackend: Send + Sync {
    /// Configure audio output. Called once at startup; an error means audio is
    /// unavailable for the lifetime of the process.
    async fn activate(&self) -> Result<()>;

    /// Create a session for `request` and start buffering. Natural completion or
    /// late failures of this session are reported through `events`.
    async fn load(
        &self,
        request: PlaybackRequest,
        events: Arc<dyn BackendEventSink>,
    ) -> Result<PlaybackSessionId>;

    /// Begin or resume audio output.
    async fn play(&self, session: PlaybackSessionId) -> Result<()>;

    /// Pause without releasing the session.
    async fn pause(&self, session: PlaybackSessionId) -> Result<()>;

    /// Seek to an absolute position within the stream.
    async fn seek(&self, session: PlaybackSessionId, position: Duration) -> Result<()>;

    /// Query the current elapsed position.
    async fn position(&self, session: PlaybackSessionId) -> Result<Duration>;

    /// Resolve the total stream duration. May take a network round trip;
    /// `Ok(None)` means the stream does not report one.
    async fn resolve_duration(&self, session: PlaybackSessionId) -> Result<Option<Duration>>;

    /// Release all resources associated with a session.
    async fn unload(&self, session: PlaybackSessionId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_unique() {
        let a = PlaybackSessionId::new();
        let b = PlaybackSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, PlaybackSessionId::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn backend_event_exposes_session() {
        let session = PlaybackSessionId::new();
        assert_eq!(BackendEvent::Finished { session }.session(), session);

        let failed = BackendEvent::Failed {
            session,
            message: "decoder stalled".to_string(),
        };
        assert_eq!(failed.session(), session);
    }

    #[test]
    fn request_carries_metadata() {
        let metadata = PlaybackMetadata {
            track_id: Some("42".to_string()),
            title: Some("Song".to_string()),
            ..PlaybackMetadata::default()
        };
        let request = PlaybackRequest::new("https://example.com/p.m4a").with_metadata(metadata);

        assert_eq!(request.url, "https://example.com/p.m4a");
        assert_eq!(request.metadata.track_id.as_deref(), Some("42"));
    }
}
