//! Error types for matching and recommendation.

use eventhub_embeddings::EmbeddingError;
use thiserror::Error;

/// Result type alias for matching operations.
pub type Result<T> = std::result::Result<T, MatchingError>;

/// Errors that can occur while matching users or ranking events.
///
/// Empty or too-small inputs are not errors; they come back as empty
/// results carrying a [`Notice`](crate::Notice).
#[derive(Error, Debug)]
pub enum MatchingError {
    /// The embedding model could not be reached or loaded.
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(#[source] EmbeddingError),

    /// The provider answered, but not with usable vectors.
    #[error("embedding error: {0}")]
    Embedding(#[source] EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML parse error.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EmbeddingError> for MatchingError {
    fn from(err: EmbeddingError) -> Self {
        if err.is_unavailable() {
            MatchingError::ModelUnavailable(err)
        } else {
            MatchingError::Embedding(err)
        }
    }
}
