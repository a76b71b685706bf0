//! Authenticated identity and roles.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Role assigned to a user account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Tester,
    #[serde(alias = "DEV")]
    Developer,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Admin => "ADMIN",
            Self::Tester => "TESTER",
            Self::Developer => "DEVELOPER",
        }
    }

    /// Token the registration endpoint expects for this role.
    #[must_use]
    pub const fn registration_token(&self) -> &'static str {
        match *self {
            Self::Admin => "ADMIN",
            Self::Tester => "TESTER",
            Self::Developer => "DEV",
        }
    }

    /// Only testers may report new bugs; the backend answers 403 otherwise.
    #[must_use]
    pub const fn can_report_bugs(&self) -> bool {
        matches!(*self, Self::Tester)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "TESTER" => Ok(Self::Tester),
            "DEVELOPER" | "DEV" => Ok(Self::Developer),
            _ => Err(CoreError::UnknownVariant { kind: "role", value: s.to_owned() }),
        }
    }
}

/// Who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(rename = "email")]
    pub email_address: String,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email_address: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email_address: email_address.into(),
            role,
        }
    }

    /// True when every field a session relies on is populated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.id.trim().is_empty() && !self.email_address.trim().is_empty()
    }

    /// Decodes a persisted identity, rejecting malformed or partial records.
    #[must_use]
    pub fn from_persisted(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(raw) {
            Ok(identity) if identity.is_complete() => Some(identity),
            Ok(_) => {
                tracing::warn!("persisted identity is missing required fields");
                None
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse persisted identity");
                None
            },
        }
    }
}
