//! Typed error enum for the client crate.

use bugdesk_core::{CoreError, Role, ValidationErrors};
use thiserror::Error;

/// Errors from API calls and session handling.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was obtained (connection refused, DNS, reset, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered 401. The session has already been cleared.
    #[error("session expired, please log in again")]
    AuthExpired,

    /// Any other non-success status.
    #[error("{message}")]
    Api { status: u16, status_text: String, message: String, raw_body: String },

    #[error("JSON parse error in {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("client initialization failed: {0}")]
    ClientInit(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A protected operation was attempted without a session.
    #[error("not logged in")]
    NotAuthenticated { redirect_to: &'static str },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid auth response: {0}")]
    InvalidAuthResponse(String),

    /// Refused locally because the backend would answer 403.
    #[error("{role} accounts cannot {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
}

impl ClientError {
    /// HTTP status of the failed response, when there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match *self {
            Self::Api { status, .. } => Some(status),
            Self::AuthExpired => Some(401),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(*self, Self::Network(_))
    }

    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(*self, Self::Api { status: 403, .. } | Self::Forbidden { .. })
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => Self::Validation(errors),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}
