//! Provider selection and construction.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EmbeddingError, Result};
use crate::hashing::HashProvider;
use crate::provider::{EmbeddingProvider, OpenAIProvider};
use crate::retry::{RetryPolicy, RetryingProvider};

/// Configuration for the embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Which provider to use.
    pub kind: ProviderKind,

    /// Model to request (provider default when unset).
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible server.
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Output dimension. Defaults to [`DEFAULT_DIMENSION`](crate::DEFAULT_DIMENSION)
    /// (384) for `hash`; for `openai` it requests shortened vectors and is
    /// otherwise left to the model.
    pub dimension: Option<usize>,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl ProviderConfig {
    /// Create a configuration for the given provider kind.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the output dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Hash,
            model: None,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            dimension: None,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible embeddings API.
    #[serde(rename = "openai")]
    OpenAI,
    /// Offline feature hashing.
    Hash,
}

/// Build the process-wide provider described by `config`.
///
/// The returned handle is meant to be created once at startup and shared
/// read-only by every matcher and ranker.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.kind {
        ProviderKind::Hash => {
            let dimension = config.dimension.unwrap_or(crate::DEFAULT_DIMENSION);
            Arc::new(RetryingProvider::new(
                HashProvider::new(dimension),
                config.retry,
            ))
        }
        ProviderKind::OpenAI => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| EmbeddingError::unavailable("openai", e))?;

            let mut provider = OpenAIProvider::new()
                .with_client(client)
                .with_api_key_env(&config.api_key_env);
            if let Some(model) = &config.model {
                provider = provider.with_model(model.as_str());
            }
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url.as_str());
            }
            if let Some(dimension) = config.dimension {
                provider = provider.with_dimensions(dimension);
            }
            Arc::new(RetryingProvider::new(provider, config.retry))
        }
    };

    info!(
        provider = provider.name(),
        model = provider.model(),
        dimension = provider.dimension(),
        available = provider.is_available(),
        "embedding provider ready"
    );

    Ok(provider)
}
