//! Configuration for the matcher and the ranker.

use std::path::Path;

use eventhub_embeddings::ProviderConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MatchingError, Result};

/// Default number of neighbours per user in top-k mode.
pub const DEFAULT_MAX_MATCHES_PER_USER: usize = 3;

/// Default similarity cutoff in threshold mode.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Default number of recommendations when bounded.
pub const DEFAULT_TOP_N: usize = 5;

/// Decimal places for threshold-mode scores when `round_scores` is unset.
pub const THRESHOLD_SCORE_DECIMALS: u32 = 4;

/// Top-level configuration: provider plus both pipelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Embedding provider configuration.
    pub provider: ProviderConfig,

    /// User matcher configuration.
    pub matcher: MatcherConfig,

    /// Recommendation ranker configuration.
    pub ranker: RankerConfig,
}

impl EngineConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading engine config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings that cannot produce a meaningful result.
    pub fn validate(&self) -> Result<()> {
        self.matcher.validate()?;
        self.ranker.validate()
    }
}

/// How the user matcher reports matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The `k` most similar other users for every user.
    TopK,
    /// Every unordered pair scoring strictly above `threshold`.
    Threshold,
}

/// Configuration for the user matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Output mode.
    pub mode: MatchMode,

    /// Neighbours per user in top-k mode.
    pub k: usize,

    /// Cutoff in threshold mode; scores equal to it are excluded.
    pub threshold: f32,

    /// Round reported scores to this many decimals. Filtering always uses
    /// the unrounded score. When unset, threshold mode rounds to
    /// [`THRESHOLD_SCORE_DECIMALS`] and top-k mode does not round.
    pub round_scores: Option<u32>,
}

impl MatcherConfig {
    /// Top-k mode with `k` neighbours and unrounded scores.
    pub fn top_k(k: usize) -> Self {
        Self {
            mode: MatchMode::TopK,
            k,
            ..Self::default()
        }
    }

    /// Threshold mode, scores rounded to four decimals.
    pub fn threshold(threshold: f32) -> Self {
        Self {
            mode: MatchMode::Threshold,
            threshold,
            ..Self::default()
        }
    }

    /// Set score rounding.
    pub fn with_round_scores(mut self, decimals: Option<u32>) -> Self {
        self.round_scores = decimals;
        self
    }

    /// Decimals reported scores are rounded to, after the mode default.
    pub fn score_decimals(&self) -> Option<u32> {
        match self.mode {
            MatchMode::Threshold => self.round_scores.or(Some(THRESHOLD_SCORE_DECIMALS)),
            MatchMode::TopK => self.round_scores,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mode == MatchMode::TopK && self.k == 0 {
            return Err(MatchingError::Config(
                "matcher.k must be at least 1".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(MatchingError::Config(format!(
                "matcher.threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::TopK,
            k: DEFAULT_MAX_MATCHES_PER_USER,
            threshold: DEFAULT_THRESHOLD,
            round_scores: None,
        }
    }
}

/// What the ranker does with an empty profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePolicy {
    /// An empty profile yields no recommendations.
    Lenient,
    /// The profile is always embedded, whatever it contains.
    Strict,
}

/// Configuration for the recommendation ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Whether to truncate to `top_n`.
    pub bounded: bool,

    /// Maximum number of recommendations when bounded.
    pub top_n: usize,

    /// Empty-profile handling.
    pub profile_policy: ProfilePolicy,

    /// Round reported scores to this many decimals.
    pub round_scores: Option<u32>,
}

impl RankerConfig {
    /// Return every candidate, best first.
    pub fn unbounded() -> Self {
        Self {
            bounded: false,
            ..Self::default()
        }
    }

    /// Return at most `top_n` candidates.
    pub fn bounded(top_n: usize) -> Self {
        Self {
            bounded: true,
            top_n,
            ..Self::default()
        }
    }

    /// Set the empty-profile policy.
    pub fn with_profile_policy(mut self, policy: ProfilePolicy) -> Self {
        self.profile_policy = policy;
        self
    }

    /// Set score rounding.
    pub fn with_round_scores(mut self, decimals: Option<u32>) -> Self {
        self.round_scores = decimals;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bounded && self.top_n == 0 {
            return Err(MatchingError::Config(
                "ranker.top_n must be at least 1 when bounded".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            bounded: true,
            top_n: DEFAULT_TOP_N,
            profile_policy: ProfilePolicy::Lenient,
            round_scores: None,
        }
    }
}
