//! Bounded retries around an embedding provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;

/// How many times to call a provider before giving up.
///
/// The default is a single attempt, so nothing is retried unless the
/// integrator asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,

    /// Delay between attempts, in milliseconds.
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    /// Retry up to `max_attempts` total attempts, waiting `delay_ms` between.
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay_ms,
        }
    }

    fn delay_for(&self, err: &EmbeddingError) -> Duration {
        let base = Duration::from_millis(self.delay_ms);
        match err {
            EmbeddingError::RateLimited { retry_after_secs } => {
                base.max(Duration::from_secs(*retry_after_secs))
            }
            _ => base,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Wraps a provider and retries transient failures per a [`RetryPolicy`].
///
/// Only errors where [`EmbeddingError::is_unavailable`] holds are retried;
/// bad input or malformed responses fail immediately.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P>
where
    P: EmbeddingProvider,
{
    /// Create a new retrying provider.
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Get the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P> EmbeddingProvider for RetryingProvider<P>
where
    P: EmbeddingProvider,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.encode(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(err) if err.is_unavailable() && attempt < max_attempts => {
                    let delay = self.policy.delay_for(&err);
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "embedding call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
