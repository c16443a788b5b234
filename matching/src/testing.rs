//! Stub providers for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use eventhub_embeddings::{Embedding, EmbeddingError, EmbeddingProvider};

/// Looks each text up in a fixed table; unknown texts get the zero vector.
pub(crate) struct MapProvider {
    vectors: HashMap<String, Embedding>,
    dimension: usize,
}

impl MapProvider {
    pub(crate) fn new() -> Self {
        Self {
            vectors: HashMap::new(),
            dimension: 2,
        }
    }

    pub(crate) fn with(mut self, text: &str, vector: Embedding) -> Self {
        self.dimension = vector.len();
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for MapProvider {
    fn name(&self) -> &str {
        "map"
    }

    fn model(&self) -> &str {
        "map-v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> eventhub_embeddings::Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyBatch);
        }
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.dimension])
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Always fails as if the model server were down.
pub(crate) struct DownProvider;

#[async_trait]
impl EmbeddingProvider for DownProvider {
    fn name(&self) -> &str {
        "down"
    }

    fn model(&self) -> &str {
        "down-v1"
    }

    fn dimension(&self) -> usize {
        2
    }

    async fn encode(&self, _texts: &[String]) -> eventhub_embeddings::Result<Vec<Embedding>> {
        Err(EmbeddingError::ModelUnavailable {
            provider: "down".to_string(),
            reason: "connection refused".to_string(),
        })
    }

    fn is_available(&self) -> bool {
        false
    }
}
