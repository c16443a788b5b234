//! Embedding providers.
//!
//! A provider maps an ordered batch of texts to index-aligned vectors of one
//! fixed dimension. The matcher and ranker only see the trait.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Trait for embedding providers.
///
/// Implementations must be deterministic: the same model and text always
/// produce the same vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model this provider encodes with.
    fn model(&self) -> &str;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Encode a batch of texts. The output is index-aligned with `texts`.
    ///
    /// An empty batch is rejected with [`EmbeddingError::EmptyBatch`].
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Encode a single text as a one-element batch.
    async fn encode_one(&self, text: &str) -> Result<Embedding> {
        let mut vectors = self.encode(&[text.to_string()]).await?;
        validate_batch(1, &vectors)?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding returned".to_string()))
    }

    /// Check if the provider is usable (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Check that a provider honoured the batch contract: one vector per input
/// and one dimension across the batch.
pub fn validate_batch(expected: usize, vectors: &[Embedding]) -> Result<()> {
    if vectors.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            vectors.len()
        )));
    }

    if let Some(first) = vectors.first() {
        let dim = first.len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }
    }

    Ok(())
}

/// OpenAI-compatible embedding provider.
///
/// Works against any server exposing `POST {base_url}/embeddings` with the
/// OpenAI request and response shape.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to request.
    model: String,

    /// Requested output dimensions (if supported by the model).
    dimensions: Option<usize>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider, reading `OPENAI_API_KEY` if set.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
        }
        .with_api_key_env("OPENAI_API_KEY")
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Take the API key from environment variable `var`. Any key set
    /// earlier is dropped, so an unset variable leaves the provider
    /// unavailable.
    pub fn with_api_key_env(mut self, var: &str) -> Self {
        self.api_key = std::env::var(var).ok();
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request shortened output vectors.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        if let Some(dims) = self.dimensions {
            return dims;
        }
        match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            "all-MiniLM-L6-v2" => 384,
            _ => 1536,
        }
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyBatch);
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EmbeddingError::unavailable(self.name(), "API key not configured"))?;

        debug!(
            "Encoding batch of {} texts with model: {}",
            texts.len(),
            self.model
        );

        let mut body = serde_json::json!({
            "input": texts,
            "model": self.model
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::unavailable(self.name(), e))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::unavailable(
                self.name(),
                format!("API error {status}: {error_text}"),
            ));
        }

        let mut result: OpenAIEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        // The API documents `data` as ordered, but `index` is authoritative.
        result.data.sort_by_key(|item| item.index);

        let vectors: Vec<Embedding> = result.data.into_iter().map(|item| item.embedding).collect();
        validate_batch(texts.len(), &vectors)?;

        info!(
            "Encoded {} texts with {}",
            vectors.len(),
            result.model
        );

        Ok(vectors)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAIProvider {
        OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri())
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().copied().map(String::from).collect()
    }

    #[test]
    fn test_openai_provider_default_dimensions() {
        let provider = OpenAIProvider::new().with_model("text-embedding-3-large");
        assert_eq!(provider.dimension(), 3072);

        let provider = provider.with_dimensions(256);
        assert_eq!(provider.dimension(), 256);
    }

    #[test]
    fn test_validate_batch() {
        assert!(validate_batch(2, &[vec![1.0, 0.0], vec![0.0, 1.0]]).is_ok());
        assert!(matches!(
            validate_batch(3, &[vec![1.0], vec![0.0]]),
            Err(EmbeddingError::InvalidResponse(_))
        ));
        assert!(matches!(
            validate_batch(2, &[vec![1.0, 0.0], vec![0.0]]),
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_encode_reorders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vectors = provider_for(&server)
            .encode(&texts(&["python", "statistics"]))
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_server_error_is_model_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .encode(&texts(&["python"]))
            .await
            .unwrap_err();

        assert!(matches!(err, EmbeddingError::ModelUnavailable { .. }));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_rate_limit_reports_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .encode(&texts(&["python"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_secs: 7
            }
        ));
    }

    #[tokio::test]
    async fn test_short_response_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "data": [ { "index": 0, "embedding": [1.0, 0.0] } ]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .encode(&texts(&["a", "b"]))
            .await
            .unwrap_err();

        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_key_and_empty_batch() {
        let provider = OpenAIProvider {
            api_key: None,
            ..OpenAIProvider::new()
        };
        assert!(!provider.is_available());

        let err = provider.encode(&texts(&["x"])).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelUnavailable { .. }));

        let err = provider.encode(&[]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyBatch));
    }

    #[test]
    fn test_api_key_env_replaces_existing_key() {
        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_api_key_env("EVENTHUB_EMBEDDINGS_UNSET_KEY");
        assert!(!provider.is_available());
    }
}
