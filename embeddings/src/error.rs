//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The model behind a provider cannot be reached or loaded.
    #[error("embedding model unavailable ({provider}): {reason}")]
    ModelUnavailable { provider: String, reason: String },

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `encode` was called with no texts.
    #[error("cannot encode an empty batch")]
    EmptyBatch,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EmbeddingError {
    pub(crate) fn unavailable(provider: &str, reason: impl std::fmt::Display) -> Self {
        Self::ModelUnavailable {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the provider itself failed, as opposed to the caller
    /// handing it bad input or the provider returning garbage.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. } | Self::RateLimited { .. }
        )
    }
}
