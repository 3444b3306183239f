//! Error types for the vector index crate.

use thiserror::Error;

/// Result type alias using the index error type.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Error type for vector index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Network/connectivity error reaching the index.
    #[error("Network error: {0}")]
    Network(String),

    /// Error reported by the index backend.
    #[error("Index error: {0}")]
    Backend(String),

    /// Requested collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IndexError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            IndexError::Network(format!("Connection failed: {}", err))
        } else {
            IndexError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::Serialization(err.to_string())
    }
}
