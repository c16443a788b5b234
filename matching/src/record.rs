//! Input records handed over by the data layer.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a user: the data layer uses integer keys, but string keys
/// are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{id}"),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Int(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Text(id)
    }
}

/// A participant described by free-text skills and interests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: EntityId,
    pub name: String,
    /// Missing or `null` skills read as the empty string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: String,
}

impl UserRecord {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, skills: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills: skills.into(),
        }
    }
}

/// An event candidate for recommendation. `title` is the display key and
/// is not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    /// Missing or `null` tags read as the empty string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: String,
}

impl EventRecord {
    pub fn new(title: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: tags.into(),
        }
    }

    /// Build a candidate from a stored event: the tags are the title followed
    /// by the description.
    pub fn from_listing(title: impl Into<String>, description: Option<&str>) -> Self {
        let title = title.into();
        let tags = format!("{title} {}", description.unwrap_or_default());
        Self { title, tags }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
