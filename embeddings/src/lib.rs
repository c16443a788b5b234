//! # Embeddings
//!
//! Text embedding providers and cosine similarity for the event platform's
//! matching and recommendation features.
//!
//! ## Features
//!
//! - **Embedding Providers**: Convert batches of text to dense vectors
//! - **Similarity Engine**: Pairwise and one-to-many cosine similarity
//! - **Retry Policy**: Explicit, bounded retries around a provider
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ProviderConfig ──► EmbeddingProvider ──► Vec<Embedding>        │
//! │                          │                      │               │
//! │                          ▼                      ▼               │
//! │          OpenAI / Hash / RetryingProvider   similarity          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod hashing;
pub mod provider;
pub mod retry;
pub mod similarity;

pub use config::{ProviderConfig, ProviderKind, build_provider};
pub use error::{EmbeddingError, Result};
pub use hashing::HashProvider;
pub use provider::{EmbeddingProvider, OpenAIProvider, validate_batch};
pub use retry::{RetryPolicy, RetryingProvider};
pub use similarity::{cosine_similarity, one_to_many, pairwise, round_score};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of the default local model (all-MiniLM-L6-v2).
pub const DEFAULT_DIMENSION: usize = 384;
