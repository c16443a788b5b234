//! # Matching
//!
//! Semantic matching for the event platform:
//!
//! - **User Matcher**: pairs participants with similar skills, either as
//!   top-k neighbour lists or as all pairs above a threshold
//! - **Recommendation Ranker**: ranks events against one user's profile
//!
//! Both take an injected [`EmbeddingProvider`] and keep no state between
//! calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eventhub_matching::{EngineConfig, UserMatcher, Recommender, build_provider};
//!
//! let config = EngineConfig::from_file("engine.toml")?;
//! let provider = build_provider(&config.provider)?;
//!
//! let matcher = UserMatcher::new(provider.clone(), config.matcher);
//! let report = matcher.match_users(&participants).await?;
//!
//! let ranker = Recommender::new(provider, config.ranker);
//! let picks = ranker.recommend(&user.skills, &events).await?;
//! ```

pub mod config;
pub mod error;
pub mod matcher;
pub mod outcome;
pub mod ranker;
pub mod record;

#[cfg(test)]
mod testing;

pub use config::{EngineConfig, MatchMode, MatcherConfig, ProfilePolicy, RankerConfig};
pub use error::{MatchingError, Result};
pub use matcher::UserMatcher;
pub use outcome::{
    MatchReport, Matches, NamedScore, Neighbor, Notice, PairMatch, Recommendation,
    RecommendationReport, UserNeighbors,
};
pub use ranker::Recommender;
pub use record::{EntityId, EventRecord, UserRecord};

// Re-export from dependencies for convenience
pub use eventhub_embeddings::{EmbeddingProvider, ProviderConfig, build_provider};
