//! Relation fields that arrive either as a bare id or as an expanded record.

use serde::{Deserialize, Serialize};

/// Resolves a record id from the `_id`/`id` pair the backend may send either of.
#[must_use]
pub fn record_id<'a>(mongo_id: Option<&'a str>, id: Option<&'a str>) -> &'a str {
    mongo_id.filter(|v| !v.is_empty()).or(id).unwrap_or("")
}

/// Expanded form of a related record (`{"_id": …, "name": …}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A reference to another resource. The backend populates some references
/// and leaves others as plain ids, sometimes for the same field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Id(String),
    Expanded(RelatedRecord),
}

impl Relation {
    /// Identifier of the referenced record, whichever form it arrived in.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        let id = match *self {
            Self::Id(ref id) => Some(id.as_str()),
            Self::Expanded(ref record) => record.mongo_id.as_deref().or(record.id.as_deref()),
        };
        id.filter(|id| !id.is_empty())
    }
}
