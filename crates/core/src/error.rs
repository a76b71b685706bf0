use std::result::Result as StdResult;

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors raised by the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No envelope rule matched the payload. Callers degrade to an empty result.
    #[error("unrecognized response shape for {resource}: {shape}")]
    Normalization { resource: String, shape: &'static str },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

pub type Result<T> = StdResult<T, CoreError>;
