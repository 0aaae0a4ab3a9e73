//! Error types for the catalog provider

use thiserror::Error;

/// Catalog search errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The query could not be turned into a request
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// The catalog answered with a non-success status
    #[error("Catalog request failed with HTTP status {status}")]
    HttpError { status: u16 },

    /// The response body was not a valid search payload
    #[error("Failed to decode catalog response: {0}")]
    DecodeError(String),

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(#[from] bridge_traits::error::BridgeError),
}

impl CatalogError {
    /// Whether retrying the same query later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::HttpError { status } => *status == 429 || *status >= 500,
            CatalogError::Network(_) => true,
            CatalogError::InvalidQuery(_) | CatalogError::DecodeError(_) => false,
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
