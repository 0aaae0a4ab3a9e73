use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] provider_itunes::CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

impl CoreError {
    /// Short message suitable for inline display next to the failing control.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Catalog(provider_itunes::CatalogError::HttpError { status }) => {
                format!("Search failed (HTTP {})", status)
            }
            CoreError::Catalog(provider_itunes::CatalogError::DecodeError(_)) => {
                "Search returned an unexpected response".to_string()
            }
            CoreError::Catalog(provider_itunes::CatalogError::Network(_)) => {
                "Network unavailable. Check your connection.".to_string()
            }
            CoreError::Playback(core_playback::PlaybackError::NoPreviewAvailable { .. }) => {
                "No preview available".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
