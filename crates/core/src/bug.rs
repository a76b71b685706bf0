//! Bug resource projection.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::relation::{Relation, record_id};

/// Workflow status of a bug.
///
/// Tokens are compared case-sensitively. Anything the client does not know is
/// kept verbatim in `Other` so it still shows up (and still counts in totals).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BugStatus {
    Open,
    InProgress,
    Closed,
    Resolved,
    Other(String),
}

impl BugStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match *self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Closed => "CLOSED",
            Self::Resolved => "RESOLVED",
            Self::Other(ref raw) => raw.as_str(),
        }
    }

    /// Exact, case-sensitive match against the known tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "OPEN" => Self::Open,
            "IN_PROGRESS" => Self::InProgress,
            "CLOSED" => Self::Closed,
            "RESOLVED" => Self::Resolved,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(*self, Self::Other(_))
    }

    /// Closed and resolved bugs need no further work.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(*self, Self::Closed | Self::Resolved)
    }
}

impl From<String> for BugStatus {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<BugStatus> for String {
    fn from(value: BugStatus) -> Self {
        match value {
            BugStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for BugStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Parses user input (`open`, `in-progress`, `IN_PROGRESS`) into a known status.
impl FromStr for BugStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match Self::from_token(&normalized) {
            Self::Other(_) => Err(CoreError::UnknownVariant { kind: "bug status", value: s.to_owned() }),
            known => Ok(known),
        }
    }
}

/// Bug priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Other(String),
}

impl Priority {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match *self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Other(ref raw) => raw.as_str(),
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Other(value),
        }
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.trim().to_ascii_uppercase()) {
            Self::Other(_) => Err(CoreError::UnknownVariant { kind: "priority", value: s.to_owned() }),
            known => Ok(known),
        }
    }
}

/// A bug as returned by `GET /bugs` and `GET /bugs/:id`.
///
/// Every field except the id is optional; relation fields may be plain ids or
/// populated records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<BugStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub project_id: Option<Relation>,
    #[serde(default)]
    pub created_by: Option<Relation>,
    #[serde(default)]
    pub assigned_to: Option<Relation>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bug {
    #[must_use]
    pub fn id(&self) -> &str {
        record_id(self.mongo_id.as_deref(), self.id.as_deref())
    }

    /// Status as the status board reads it: case-insensitive, `-` taken as
    /// `_`, and a missing or blank status counted as open.
    #[must_use]
    pub fn board_status(&self) -> BugStatus {
        let token = self.status.as_ref().map(|s| s.as_str().trim().to_ascii_uppercase().replace('-', "_"));
        match token.as_deref() {
            None | Some("") => BugStatus::Open,
            Some(token) => BugStatus::from_token(token),
        }
    }

    /// Id of the owning project, whichever relation form it arrived in.
    #[must_use]
    pub fn project_ref(&self) -> Option<&str> {
        self.project_id.as_ref().and_then(Relation::id)
    }
}

/// Body for `POST /bugs`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBug {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub project_id: String,
}

/// Query filters accepted by `GET /bugs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFilter {
    pub status: Option<BugStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<String>,
}

impl BugFilter {
    /// Query pairs in the order the bug list view sends them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if let Some(ref priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_owned()));
        }
        if let Some(ref project_id) = self.project_id {
            pairs.push(("projectId", project_id.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tokens_are_case_sensitive() {
        assert_eq!(BugStatus::from_token("OPEN"), BugStatus::Open);
        assert_eq!(BugStatus::from_token("open"), BugStatus::Other("open".to_owned()));
        assert!(!BugStatus::from_token("BLOCKED").is_known());
    }

    #[test]
    fn test_status_from_str_accepts_cli_spellings() {
        assert_eq!("in-progress".parse::<BugStatus>().unwrap(), BugStatus::InProgress);
        assert_eq!("RESOLVED".parse::<BugStatus>().unwrap(), BugStatus::Resolved);
        assert!("blocked".parse::<BugStatus>().is_err());
    }

    #[test]
    fn test_board_status_folds_spelling_and_defaults_to_open() {
        let with = |status: serde_json::Value| -> Bug {
            serde_json::from_value(serde_json::json!({"_id": "b1", "status": status})).unwrap()
        };
        assert_eq!(with(serde_json::json!("in-progress")).board_status(), BugStatus::InProgress);
        assert_eq!(with(serde_json::json!("Closed")).board_status(), BugStatus::Closed);
        assert_eq!(with(serde_json::json!("")).board_status(), BugStatus::Open);
        assert_eq!(with(serde_json::Value::Null).board_status(), BugStatus::Open);
        assert_eq!(with(serde_json::json!("blocked")).board_status(), BugStatus::Other("BLOCKED".to_owned()));
    }

    #[test]
    fn test_unknown_status_survives_roundtrip() {
        let status: BugStatus = serde_json::from_str("\"BLOCKED\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"BLOCKED\"");
    }

    #[test]
    fn test_bug_decodes_populated_project() {
        let bug: Bug = serde_json::from_value(serde_json::json!({
            "_id": "b1",
            "title": "Crash on save",
            "status": "OPEN",
            "priority": "HIGH",
            "projectId": {"_id": "p1", "name": "Editor"},
            "createdAt": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(bug.id(), "b1");
        assert_eq!(bug.project_ref(), Some("p1"));
        assert_eq!(bug.status, Some(BugStatus::Open));
        assert_eq!(bug.priority, Some(Priority::High));
        assert!(bug.created_at.is_some());
    }

    #[test]
    fn test_bug_decodes_with_only_id() {
        let bug: Bug = serde_json::from_value(serde_json::json!({"id": "b2"})).unwrap();
        assert_eq!(bug.id(), "b2");
        assert_eq!(bug.status, None);
        assert_eq!(bug.project_ref(), None);
    }

    #[test]
    fn test_filter_query_pairs() {
        let filter = BugFilter {
            status: Some(BugStatus::Open),
            priority: None,
            project_id: Some("p9".to_owned()),
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("status", "OPEN".to_owned()), ("projectId", "p9".to_owned())]
        );
        assert!(BugFilter::default().query_pairs().is_empty());
    }

    #[test]
    fn test_new_bug_uses_camel_case() {
        let body = serde_json::to_value(NewBug {
            title: "t".to_owned(),
            description: "d".to_owned(),
            priority: Priority::Low,
            project_id: "p1".to_owned(),
        })
        .unwrap();
        assert_eq!(body["projectId"], "p1");
        assert_eq!(body["priority"], "LOW");
    }
}
