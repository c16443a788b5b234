//! Deterministic feature-hashing provider.
//!
//! Needs no model download or network access, so it backs offline
//! deployments and tests. Texts sharing words land close together; there is
//! no notion of synonyms.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;
use crate::similarity::normalize;
use crate::{DEFAULT_DIMENSION, Embedding};

/// Fixed SipHash keys. Changing them changes every vector, so bump
/// [`HashProvider::model`] along with them.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

/// Feature-hashing embedder over lowercase word tokens.
///
/// Each token adds a signed unit to one bucket, and the result is L2
/// normalised. The empty string encodes to the zero vector.
pub struct HashProvider {
    dimension: usize,
}

impl HashProvider {
    /// Create a provider producing `dimension`-length vectors (minimum 1).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let idx = (Self::hash(&token) % self.dimension as u64) as usize;
            let sign = if Self::hash(&format!("{token}_sign")) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign;
        }

        normalize(&mut vector);
        vector
    }
}

impl Default for HashProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

/// Lowercase alphanumeric runs; everything else separates tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for HashProvider {
    fn name(&self) -> &str {
        "hash"
    }

    fn model(&self) -> &str {
        "hash-v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyBatch);
        }

        debug!(count = texts.len(), dimension = self.dimension, "hash-encoding batch");
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}
