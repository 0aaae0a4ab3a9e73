//! # Playback Error Types

use bridge_traits::error::BridgeError;
use core_library::TrackId;
use thiserror::Error;

/// Errors returned by playback commands.
///
/// Superseded async results (a duration that resolves after its session was
/// replaced, a sampler tick that lands after a pause) are not errors: the
/// controller drops them and logs at `debug`.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The track has no playable preview. State is left unchanged.
    #[error("No preview available for track {track_id}")]
    NoPreviewAvailable { track_id: TrackId },

    /// Audio output could not be initialized; playback commands are disabled.
    #[error("Audio backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The media backend rejected a command.
    #[error("Media backend error: {0}")]
    Backend(#[from] BridgeError),

    #[error("Invalid playback configuration: {0}")]
    Config(String),
}

impl PlaybackError {
    /// Returns `true` for conditions shown to the user as an informational state
    /// rather than a failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PlaybackError::NoPreviewAvailable { .. } | PlaybackError::BackendUnavailable(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
