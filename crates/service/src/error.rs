//! Typed error enum for the service layer.

use bugdesk_client::ClientError;
use thiserror::Error;

/// Service-layer error wrapping API failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The underlying API call failed.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Caller provided invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Whether the session was torn down by this failure.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(*self, Self::Client(ClientError::AuthExpired))
    }
}
