//! Skill-similarity matching between users.

use std::sync::Arc;

use eventhub_embeddings::{Embedding, EmbeddingProvider, pairwise, round_score, validate_batch};
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use crate::config::{MatchMode, MatcherConfig};
use crate::error::Result;
use crate::outcome::{MatchReport, Matches, Neighbor, Notice, PairMatch, UserNeighbors};
use crate::record::UserRecord;

/// Matches users against each other by the similarity of their skills.
///
/// Holds no per-call state; one instance can serve concurrent requests as
/// long as the provider can.
pub struct UserMatcher {
    provider: Arc<dyn EmbeddingProvider>,
    config: MatcherConfig,
}

impl UserMatcher {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: MatcherConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match `users` according to the configured mode.
    pub async fn match_users(&self, users: &[UserRecord]) -> Result<MatchReport> {
        match self.config.mode {
            MatchMode::TopK => self.top_k_neighbors(users).await,
            MatchMode::Threshold => self.threshold_pairs(users).await,
        }
    }

    /// For every user, the `k` most similar other users, best first. Ties
    /// keep input order.
    pub async fn top_k_neighbors(&self, users: &[UserRecord]) -> Result<MatchReport> {
        let Some(scores) = self.score_matrix(users).await? else {
            return Ok(MatchReport::empty(
                Matches::Neighbors(Vec::new()),
                Notice::NotEnoughEntities { found: users.len() },
            ));
        };

        let k = self.config.k;
        let neighbors = users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let mut ranked: Vec<(usize, f32)> = scores[i]
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .collect();
                // Stable: equal scores stay in input order.
                ranked.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));

                let matches = ranked
                    .into_iter()
                    .take(k)
                    .map(|(j, score)| Neighbor {
                        id: users[j].id.clone(),
                        name: users[j].name.clone(),
                        similarity: self.report_score(score),
                    })
                    .collect();

                UserNeighbors {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    matches,
                }
            })
            .collect::<Vec<_>>();

        info!(users = users.len(), k, "computed top-k skill matches");
        Ok(MatchReport {
            matches: Matches::Neighbors(neighbors),
            notice: None,
        })
    }

    /// Every pair `(i, j)`, `i < j`, whose similarity is strictly above the
    /// threshold, in enumeration order.
    pub async fn threshold_pairs(&self, users: &[UserRecord]) -> Result<MatchReport> {
        let Some(scores) = self.score_matrix(users).await? else {
            return Ok(MatchReport::empty(
                Matches::Pairs(Vec::new()),
                Notice::NotEnoughEntities { found: users.len() },
            ));
        };

        let threshold = self.config.threshold;
        let mut pairs = Vec::new();
        for i in 0..users.len() {
            for j in (i + 1)..users.len() {
                let score = scores[i][j];
                if score > threshold {
                    pairs.push(PairMatch {
                        user1_id: users[i].id.clone(),
                        user1_name: users[i].name.clone(),
                        user2_id: users[j].id.clone(),
                        user2_name: users[j].name.clone(),
                        similarity_score: self.report_score(score),
                    });
                }
            }
        }

        info!(
            users = users.len(),
            threshold,
            pairs = pairs.len(),
            "computed threshold skill matches"
        );
        Ok(MatchReport {
            matches: Matches::Pairs(pairs),
            notice: None,
        })
    }

    /// Embed all skills in one batch and score every pair. `None` when there
    /// are fewer than two users.
    async fn score_matrix(&self, users: &[UserRecord]) -> Result<Option<Vec<Vec<f32>>>> {
        if users.len() < 2 {
            info!(found = users.len(), "not enough users for matching");
            return Ok(None);
        }

        let skills: Vec<String> = users.iter().map(|u| u.skills.clone()).collect();
        debug!(
            count = skills.len(),
            provider = self.provider.name(),
            "embedding user skills"
        );
        let embeddings: Vec<Embedding> = self.provider.encode(&skills).await?;
        validate_batch(skills.len(), &embeddings)?;

        Ok(Some(pairwise(&embeddings)?))
    }

    fn report_score(&self, score: f32) -> f32 {
        match self.config.score_decimals() {
            Some(decimals) => round_score(score, decimals),
            None => score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::MatchingError;
    use crate::record::EntityId;
    use crate::testing::{DownProvider, MapProvider};
    use eventhub_embeddings::cosine_similarity;
    use pretty_assertions::assert_eq;

    fn users(specs: &[(i64, &str, &str)]) -> Vec<UserRecord> {
        specs
            .iter()
            .map(|(id, name, skills)| UserRecord::new(*id, *name, *skills))
            .collect()
    }

    fn provider() -> Arc<dyn EmbeddingProvider> {
        Arc::new(
            MapProvider::new()
                .with("a", vec![1.0, 0.0])
                .with("b", vec![0.9, 0.1])
                .with("c", vec![0.0, 1.0])
                .with("d", vec![-1.0, 0.0]),
        )
    }

    fn neighbors(report: &MatchReport) -> &[UserNeighbors] {
        match &report.matches {
            Matches::Neighbors(n) => n,
            Matches::Pairs(_) => panic!("expected neighbours"),
        }
    }

    fn pairs(report: &MatchReport) -> &[PairMatch] {
        match &report.matches {
            Matches::Pairs(p) => p,
            Matches::Neighbors(_) => panic!("expected pairs"),
        }
    }

    #[tokio::test]
    async fn top_k_excludes_self_and_sorts_descending() {
        let matcher = UserMatcher::new(provider(), MatcherConfig::top_k(3));
        let input = users(&[(1, "A", "a"), (2, "B", "b"), (3, "C", "c"), (4, "D", "d")]);

        let report = matcher.match_users(&input).await.unwrap();
        assert_eq!(report.notice, None);

        let all = neighbors(&report);
        assert_eq!(all.len(), 4);
        for user in all {
            assert_eq!(user.matches.len(), 3);
            assert!(user.matches.iter().all(|m| m.id != user.id));
            assert!(
                user.matches
                    .windows(2)
                    .all(|w| w[0].similarity >= w[1].similarity)
            );
        }

        let names: Vec<&str> = all[0].matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "D"]);
    }

    #[tokio::test]
    async fn top_k_truncates_to_k() {
        let matcher = UserMatcher::new(provider(), MatcherConfig::top_k(1));
        let input = users(&[(1, "A", "a"), (2, "B", "b"), (3, "C", "c")]);

        let report = matcher.top_k_neighbors(&input).await.unwrap();
        let all = neighbors(&report);
        assert!(all.iter().all(|u| u.matches.len() == 1));
        assert_eq!(all[2].matches[0].name, "B");
    }

    #[tokio::test]
    async fn top_k_ties_keep_input_order() {
        let matcher = UserMatcher::new(provider(), MatcherConfig::top_k(3));
        // Everyone but the first shares one descriptor, so the first user's
        // neighbours all tie.
        let input = users(&[(1, "A", "a"), (2, "X", "c"), (3, "Y", "c"), (4, "Z", "c")]);

        let report = matcher.top_k_neighbors(&input).await.unwrap();
        let names: Vec<&str> = neighbors(&report)[0]
            .matches
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[tokio::test]
    async fn fewer_than_two_users_is_informational() {
        let matcher = UserMatcher::new(provider(), MatcherConfig::top_k(3));

        let report = matcher.match_users(&users(&[(1, "A", "a")])).await.unwrap();
        assert!(report.matches.is_empty());
        assert_eq!(report.notice, Some(Notice::NotEnoughEntities { found: 1 }));

        let matcher = UserMatcher::new(provider(), MatcherConfig::threshold(0.5));
        let report = matcher.match_users(&[]).await.unwrap();
        assert_eq!(report.matches, Matches::Pairs(Vec::new()));
        assert_eq!(report.notice, Some(Notice::NotEnoughEntities { found: 0 }));
    }

    #[tokio::test]
    async fn threshold_is_strict_and_in_enumeration_order() {
        let exact = cosine_similarity(&[1.0, 0.0], &[0.9, 0.1]).unwrap();
        let matcher = UserMatcher::new(provider(), MatcherConfig::threshold(exact));
        let input = users(&[(1, "A", "a"), (2, "B", "b"), (3, "A2", "a"), (4, "B2", "b")]);

        let report = matcher.match_users(&input).await.unwrap();
        let ids: Vec<(EntityId, EntityId)> = pairs(&report)
            .iter()
            .map(|p| (p.user1_id.clone(), p.user2_id.clone()))
            .collect();

        // a~b scores exactly the threshold and is excluded; only identical
        // descriptors clear it.
        assert_eq!(
            ids,
            vec![
                (EntityId::Int(1), EntityId::Int(3)),
                (EntityId::Int(2), EntityId::Int(4)),
            ]
        );
    }

    #[tokio::test]
    async fn threshold_keeps_duplicates_and_rounds() {
        let matcher = UserMatcher::new(provider(), MatcherConfig::threshold(0.5));
        let input = users(&[(1, "A", "b"), (2, "B", "b"), (3, "C", "c")]);

        let report = matcher.threshold_pairs(&input).await.unwrap();
        let found = pairs(&report);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user1_name, "A");
        assert_eq!(found[0].user2_name, "B");
        assert_eq!(found[0].similarity_score, 1.0);

        // b against c is ~0.1104 and stays below the cutoff.
        let lenient = UserMatcher::new(provider(), MatcherConfig::threshold(0.1));
        let report = lenient.threshold_pairs(&input).await.unwrap();
        let scores: Vec<f32> = pairs(&report).iter().map(|p| p.similarity_score).collect();
        assert_eq!(scores, vec![1.0, 0.1104, 0.1104]);
    }

    #[tokio::test]
    async fn threshold_from_toml_reports_four_decimals() {
        let config = EngineConfig::from_toml_str("[matcher]\nmode = \"threshold\"\n").unwrap();
        let config = config.matcher;
        let matcher = UserMatcher::new(provider(), config);
        let input = users(&[(1, "A", "a"), (2, "B", "b")]);

        let report = matcher.match_users(&input).await.unwrap();
        let scores: Vec<f32> = pairs(&report).iter().map(|p| p.similarity_score).collect();
        assert_eq!(scores, vec![0.9939]);

        // Top-k leaves scores unrounded unless asked.
        let raw = cosine_similarity(&[1.0, 0.0], &[0.9, 0.1]).unwrap();
        let matcher = UserMatcher::new(provider(), MatcherConfig::top_k(1));
        let report = matcher.match_users(&input).await.unwrap();
        assert_eq!(neighbors(&report)[0].matches[0].similarity, raw);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let matcher = UserMatcher::new(Arc::new(DownProvider), MatcherConfig::default());
        let input = users(&[(1, "A", "a"), (2, "B", "b")]);

        let err = matcher.match_users(&input).await.unwrap_err();
        assert!(matches!(err, MatchingError::ModelUnavailable(_)));
    }
}
