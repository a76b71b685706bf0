//! Project and user resource projections.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::relation::{Relation, record_id};

/// Lifecycle status of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Archived,
    Other(String),
}

impl ProjectStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match *self {
            Self::Active => "ACTIVE",
            Self::OnHold => "ON_HOLD",
            Self::Completed => "COMPLETED",
            Self::Archived => "ARCHIVED",
            Self::Other(ref raw) => raw.as_str(),
        }
    }
}

impl From<String> for ProjectStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => Self::Active,
            "ON_HOLD" => Self::OnHold,
            "COMPLETED" => Self::Completed,
            "ARCHIVED" => Self::Archived,
            _ => Self::Other(value),
        }
    }
}

impl From<ProjectStatus> for String {
    fn from(value: ProjectStatus) -> Self {
        match value {
            ProjectStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.trim().to_ascii_uppercase().replace('-', "_")) {
            Self::Other(_) => {
                Err(CoreError::UnknownVariant { kind: "project status", value: s.to_owned() })
            },
            known => Ok(known),
        }
    }
}

/// A user account as listed by `GET /users` or embedded as a project member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    #[must_use]
    pub fn id(&self) -> &str {
        record_id(self.mongo_id.as_deref(), self.id.as_deref())
    }
}

/// A project as returned by `GET /project` and `GET /project/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub created_by: Option<Relation>,
    /// Members may be populated records or bare ids depending on the endpoint.
    #[serde(default)]
    pub members: Vec<Relation>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    #[must_use]
    pub fn id(&self) -> &str {
        record_id(self.mongo_id.as_deref(), self.id.as_deref())
    }

    #[must_use]
    pub fn status_or_default(&self) -> ProjectStatus {
        self.status.clone().unwrap_or(ProjectStatus::Active)
    }

    #[must_use]
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.id() == Some(user_id))
    }
}

/// Body for `POST /project`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for `PATCH /project/:id`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

impl ProjectUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Users who can still be added to `project`.
#[must_use]
pub fn available_users<'a>(users: &'a [User], project: &Project) -> Vec<&'a User> {
    users.iter().filter(|u| !project.has_member(u.id())).collect()
}
