//! Envelope normalization for API responses.
//!
//! The backend wraps the same payload differently depending on endpoint and
//! version: a bare array, `{"data": [...]}`, or a resource-named wrapper such as
//! `{"bugs": [...]}`. Everything that reads a response goes through
//! [`Normalizer`] instead of sniffing shapes locally.
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. the value already has the expected shape;
//! 2. a `data` property with the expected shape;
//! 3. a resource-named property (`bugs`/`bug`, …) with the expected shape;
//! 4. collections only, when enabled: the first array-valued property in
//!    document order;
//! 5. otherwise [`CoreError::Normalization`].
//!
//! This is envelope tolerance, not schema validation. Elements are not checked.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::env_config::env_parse_with_default;
use crate::error::{CoreError, Result};

/// Resource families served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bugs,
    Projects,
    Users,
}

impl ResourceKind {
    /// Wrapper key used for collections (`{"bugs": [...]}`).
    #[must_use]
    pub const fn collection_key(&self) -> &'static str {
        match *self {
            Self::Bugs => "bugs",
            Self::Projects => "projects",
            Self::Users => "users",
        }
    }

    /// Wrapper key used for single records (`{"bug": {...}}`).
    #[must_use]
    pub const fn resource_key(&self) -> &'static str {
        match *self {
            Self::Bugs => "bug",
            Self::Projects => "project",
            Self::Users => "user",
        }
    }
}

/// Tunables for the lenient rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizePolicy {
    /// Fall back to the first array-valued property when no known key matches.
    /// This can hide a malformed response behind an unrelated list.
    pub scan_for_first_array: bool,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self { scan_for_first_array: true }
    }
}

impl NormalizePolicy {
    /// Reads `BUGDESK_NORMALIZE_SCAN` (default `true`).
    #[must_use]
    pub fn from_env() -> Self {
        Self { scan_for_first_array: env_parse_with_default("BUGDESK_NORMALIZE_SCAN", true) }
    }

    #[must_use]
    pub const fn strict() -> Self {
        Self { scan_for_first_array: false }
    }
}

/// Extracts the meaningful value from a decoded response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    policy: NormalizePolicy,
}

impl Normalizer {
    #[must_use]
    pub const fn new(policy: NormalizePolicy) -> Self {
        Self { policy }
    }

    /// Locates the collection array inside `value`.
    ///
    /// # Errors
    /// Returns [`CoreError::Normalization`] when no rule matches.
    pub fn collection<'a>(&self, value: &'a Value, kind: ResourceKind) -> Result<&'a [Value]> {
        if let Some(items) = value.as_array() {
            return Ok(items.as_slice());
        }
        if let Some(items) = value.get("data").and_then(Value::as_array) {
            return Ok(items.as_slice());
        }
        if let Some(items) = value.get(kind.collection_key()).and_then(Value::as_array) {
            return Ok(items.as_slice());
        }
        if self.policy.scan_for_first_array
            && let Some(fields) = value.as_object()
            && let Some((key, items)) =
                fields.iter().find_map(|(k, v)| v.as_array().map(|items| (k, items)))
        {
            tracing::debug!(
                resource = kind.collection_key(),
                key = %key,
                "collection found by scanning for first array property"
            );
            return Ok(items.as_slice());
        }
        Err(CoreError::Normalization {
            resource: kind.collection_key().to_owned(),
            shape: describe(value),
        })
    }

    /// Locates a single record inside `value`.
    ///
    /// # Errors
    /// Returns [`CoreError::Normalization`] when no rule matches.
    pub fn resource<'a>(&self, value: &'a Value, kind: ResourceKind) -> Result<&'a Value> {
        if is_record(value) {
            return Ok(value);
        }
        if let Some(inner) = value.get("data").filter(|v| is_record(v)) {
            return Ok(inner);
        }
        if let Some(inner) = value.get(kind.resource_key()).filter(|v| is_record(v)) {
            return Ok(inner);
        }
        Err(CoreError::Normalization { resource: kind.resource_key().to_owned(), shape: describe(value) })
    }

    /// Typed decode-or-default for collections.
    ///
    /// An unrecognized envelope yields an empty list; elements that do not
    /// decode as `T` are skipped. Both cases are logged at warn level.
    #[must_use]
    pub fn decode_collection<T: DeserializeOwned>(&self, value: &Value, kind: ResourceKind) -> Vec<T> {
        let items = match self.collection(value, kind) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "treating response as empty collection");
                return Vec::new();
            },
        };
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value::<T>(item.clone()) {
                Ok(record) => decoded.push(record),
                Err(e) => {
                    tracing::warn!(
                        resource = kind.collection_key(),
                        index,
                        error = %e,
                        "skipping element that failed to decode"
                    );
                },
            }
        }
        decoded
    }

    /// Typed decode-or-default for single records.
    #[must_use]
    pub fn decode_resource<T: DeserializeOwned>(&self, value: &Value, kind: ResourceKind) -> Option<T> {
        let record = match self.resource(value, kind) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "treating response as absent record");
                return None;
            },
        };
        match serde_json::from_value::<T>(record.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(resource = kind.resource_key(), error = %e, "record failed to decode");
                None
            },
        }
    }
}

fn is_record(value: &Value) -> bool {
    value.as_object().is_some_and(|o| o.contains_key("_id") || o.contains_key("id"))
}

const fn describe(value: &Value) -> &'static str {
    match *value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
