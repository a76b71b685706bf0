use std::sync::Arc;

use bugdesk_core::Normalizer;
use bugdesk_core::constants::MAX_LOGGED_BODY_LEN;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;

/// JSON client for the bug-tracker API.
///
/// Every call reads the credential from the shared [`SessionStore`] and a 401
/// from any endpoint tears the session down.
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) normalizer: Normalizer,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &self.http)
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

impl ApiClient {
    /// Creates a client bound to `session`.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built (TLS backend failure).
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ClientError::ClientInit(e.to_string()))?;

        Ok(Self { http, base_url, session, normalizer: Normalizer::new(config.normalize) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sends one request and returns the decoded success body verbatim.
    ///
    /// An empty success body decodes as `null`. No retries.
    ///
    /// # Errors
    /// - [`ClientError::Network`] when no response was obtained
    /// - [`ClientError::AuthExpired`] on 401, after clearing the session
    /// - [`ClientError::Api`] on any other non-success status
    /// - [`ClientError::Decode`] when a success body is not JSON
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        let url = self.url(path, query)?;
        let credential = self.session.credential();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for &(name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(token) = credential.as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(payload) = body {
            request = request.json(payload);
        }

        tracing::debug!(%method, path, has_auth = credential.is_some(), "sending request");
        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "request failed without a response");
            ClientError::Network(e)
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "received response");

        // 401 bodies are never read
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, path, "credential rejected");
            self.session.expire();
            return Err(ClientError::AuthExpired);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let err = api_error(status, text);
            tracing::error!(%method, path, status = status.as_u16(), error = %err, "API call failed");
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode {
            context: format!("{method} {path} (body: {})", truncate(&text, MAX_LOGGED_BODY_LEN)),
            source: e,
        })
    }

    /// # Errors
    /// See [`Self::request`].
    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::GET, path, &[], None, &[]).await
    }

    /// # Errors
    /// See [`Self::request`].
    pub async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ClientError> {
        self.request(Method::GET, path, query, None, &[]).await
    }

    /// # Errors
    /// See [`Self::request`].
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.request(Method::POST, path, &[], Some(body), &[]).await
    }

    /// # Errors
    /// See [`Self::request`].
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.request(Method::PUT, path, &[], Some(body), &[]).await
    }

    /// # Errors
    /// See [`Self::request`].
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.request(Method::PATCH, path, &[], Some(body), &[]).await
    }

    /// # Errors
    /// See [`Self::request`].
    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::DELETE, path, &[], None, &[]).await
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ClientError> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        let mut url = Url::parse(&joined).map_err(|e| ClientError::InvalidUrl(format!("{joined}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

/// Builds the error for a non-success, non-401 response.
///
/// The message comes from the JSON body's `message`, then `error`, then the raw
/// text body, then `API Error: <status> <reason>`.
pub(crate) fn api_error(status: StatusCode, raw_body: String) -> ClientError {
    let status_text = status.canonical_reason().unwrap_or_default().to_owned();
    let fallback = || format!("API Error: {} {status_text}", status.as_u16());

    let message = match serde_json::from_str::<Value>(&raw_body) {
        Ok(parsed) => ["message", "error"]
            .iter()
            .find_map(|key| parsed.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map_or_else(fallback, str::to_owned),
        Err(_) if !raw_body.trim().is_empty() => truncate(raw_body.trim(), MAX_LOGGED_BODY_LEN).to_owned(),
        Err(_) => fallback(),
    };

    ClientError::Api { status: status.as_u16(), status_text, message, raw_body }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
