//! Result structures returned to the service layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::EntityId;

/// Why a result came back empty. Informational, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Notice {
    /// Matching needs at least two users.
    NotEnoughEntities { found: usize },
    /// The query profile was empty.
    EmptyProfile,
    /// There were no events to rank.
    NoCandidates,
}

impl Notice {
    /// Human-readable message for API responses.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NotEnoughEntities { .. } => "Not enough participants for matching.",
            Notice::EmptyProfile => "User profile is empty.",
            Notice::NoCandidates => "No events found to recommend.",
        }
    }
}

/// One neighbour of a user in top-k mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: EntityId,
    pub name: String,
    pub similarity: f32,
}

/// A user with its best neighbours, highest similarity first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNeighbors {
    pub id: EntityId,
    pub name: String,
    pub matches: Vec<Neighbor>,
}

/// A pair of users scoring above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMatch {
    pub user1_id: EntityId,
    pub user1_name: String,
    pub user2_id: EntityId,
    pub user2_name: String,
    pub similarity_score: f32,
}

/// Matcher output, shaped by the configured mode.
///
/// Serialized as `{"mode": "top_k" | "threshold", "entries": [...]}` so an
/// empty list still says which shape it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "entries")]
pub enum Matches {
    #[serde(rename = "top_k")]
    Neighbors(Vec<UserNeighbors>),
    #[serde(rename = "threshold")]
    Pairs(Vec<PairMatch>),
}

impl Matches {
    pub fn len(&self) -> usize {
        match self {
            Matches::Neighbors(users) => users.len(),
            Matches::Pairs(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one matching call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub matches: Matches,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl MatchReport {
    pub(crate) fn empty(matches: Matches, notice: Notice) -> Self {
        Self {
            matches,
            notice: Some(notice),
        }
    }

    /// Top-k results as `name -> [{name, similarity}]`, in input order.
    ///
    /// Names are display strings, not keys: when two users share a name the
    /// later one replaces the earlier entry, keeping the earlier position.
    /// Threshold reports yield an empty map.
    pub fn neighbors_by_name(&self) -> IndexMap<String, Vec<NamedScore>> {
        let mut map = IndexMap::new();
        if let Matches::Neighbors(users) = &self.matches {
            for user in users {
                let scores = user
                    .matches
                    .iter()
                    .map(|n| NamedScore {
                        name: n.name.clone(),
                        similarity: n.similarity,
                    })
                    .collect();
                map.insert(user.name.clone(), scores);
            }
        }
        map
    }
}

/// `{name, similarity}` entry of [`MatchReport::neighbors_by_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScore {
    pub name: String,
    pub similarity: f32,
}

/// A ranked event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    #[serde(alias = "score")]
    pub similarity: f32,
}

/// Result of one recommendation call, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl RecommendationReport {
    pub(crate) fn empty(notice: Notice) -> Self {
        Self {
            recommendations: Vec::new(),
            notice: Some(notice),
        }
    }
}
