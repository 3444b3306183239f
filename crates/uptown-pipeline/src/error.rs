//! Error types for the recommendation pipeline.

use thiserror::Error;

/// Result type alias using the pipeline error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error type for pipeline operations.
///
/// Filter extraction never surfaces here: extraction failures degrade to
/// an unfiltered search. Retrieval and composition errors are fatal to
/// the request and propagate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Language model error (embedding or completion).
    #[error("LLM error: {0}")]
    Llm(#[from] uptown_llm::LlmError),

    /// Vector index error.
    #[error("Index error: {0}")]
    Index(#[from] uptown_index::IndexError),

    /// Internal pipeline error.
    #[error("Internal error: {0}")]
    Internal(String),
}
