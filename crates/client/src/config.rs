//! Client configuration from the environment.

use std::time::Duration;

use bugdesk_core::constants::DEFAULT_API_URL;
use bugdesk_core::{NormalizePolicy, env_non_empty, env_parse_with_default};

/// Settings for [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash (e.g. `http://localhost:5000/api`).
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub normalize: NormalizePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            request_timeout: None,
            normalize: NormalizePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Reads `BUGDESK_API_URL`, `BUGDESK_REQUEST_TIMEOUT_SECS` (0 disables) and
    /// `BUGDESK_NORMALIZE_SCAN`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env_non_empty("BUGDESK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let timeout_secs: u64 = env_parse_with_default("BUGDESK_REQUEST_TIMEOUT_SECS", 0);
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            normalize: NormalizePolicy::from_env(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_normalize_policy(mut self, policy: NormalizePolicy) -> Self {
        self.normalize = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://api.test/v1/");
        assert_eq!(config.base_url, "http://api.test/v1");
    }

    #[test]
    fn test_default_has_no_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert!(config.request_timeout.is_none());
        assert!(config.normalize.scan_for_first_array);
    }
}
