//! Event recommendations for a single profile.

use std::sync::Arc;

use eventhub_embeddings::{EmbeddingProvider, one_to_many, round_score, validate_batch};
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use crate::config::{ProfilePolicy, RankerConfig};
use crate::error::Result;
use crate::outcome::{Notice, Recommendation, RecommendationReport};
use crate::record::{EventRecord, UserRecord};

/// Ranks events by how closely their tags match a profile string.
pub struct Recommender {
    provider: Arc<dyn EmbeddingProvider>,
    config: RankerConfig,
}

impl Recommender {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: RankerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Rank `events` against `profile`, best first. Ties keep input order.
    pub async fn recommend(
        &self,
        profile: &str,
        events: &[EventRecord],
    ) -> Result<RecommendationReport> {
        if events.is_empty() {
            info!("no events to recommend");
            return Ok(RecommendationReport::empty(Notice::NoCandidates));
        }
        if profile.is_empty() && self.config.profile_policy == ProfilePolicy::Lenient {
            info!("empty profile, skipping recommendations");
            return Ok(RecommendationReport::empty(Notice::EmptyProfile));
        }

        debug!(
            candidates = events.len(),
            provider = self.provider.name(),
            "embedding profile and event tags"
        );
        let query = self.provider.encode_one(profile).await?;
        let tags: Vec<String> = events.iter().map(|e| e.tags.clone()).collect();
        let candidates = self.provider.encode(&tags).await?;
        validate_batch(tags.len(), &candidates)?;

        let scores = one_to_many(&query, &candidates)?;

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));
        if self.config.bounded {
            ranked.truncate(self.config.top_n);
        }

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .map(|(i, score)| Recommendation {
                title: events[i].title.clone(),
                similarity: match self.config.round_scores {
                    Some(decimals) => round_score(score, decimals),
                    None => score,
                },
            })
            .collect();

        info!(
            candidates = events.len(),
            returned = recommendations.len(),
            "ranked event recommendations"
        );
        Ok(RecommendationReport {
            recommendations,
            notice: None,
        })
    }

    /// Rank `events` for `user`, using their skills as the profile.
    pub async fn recommend_for_user(
        &self,
        user: &UserRecord,
        events: &[EventRecord],
    ) -> Result<RecommendationReport> {
        debug!(user = %user.id, "recommending events for user");
        self.recommend(&user.skills, events).await
    }
}
