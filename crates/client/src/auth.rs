//! Login and registration.

use std::str::FromStr;

use bugdesk_core::{Identity, LoginInput, RegisterInput, Role};
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::error::ClientError;

/// Extracts identity and credential from an auth response.
///
/// Accepted shapes:
/// - `{ "user": {...}, "token": "..." }`
/// - `{ "id", "name", "role", "email"?, "token" }`
/// - `{ "data": { "user": {...}, "token": "..." } }`
/// - `{ "data": { "id", "name", "role", "email"?, "token" } }`
///
/// `submitted_email` fills in a missing `email`.
///
/// # Errors
/// Returns [`ClientError::InvalidAuthResponse`] when the user or token is
/// missing or the user record is unusable.
pub fn parse_auth_response(value: &Value, submitted_email: &str) -> Result<(Identity, String), ClientError> {
    let root = value.get("data").filter(|v| v.is_object()).unwrap_or(value);

    let token = [root, value]
        .into_iter()
        .find_map(|v| v.get("token").and_then(Value::as_str))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::InvalidAuthResponse("missing user or token".to_owned()))?;

    let user = match root.get("user").filter(|v| v.is_object()) {
        Some(user) => user,
        None if has_id(root) => root,
        None => return Err(ClientError::InvalidAuthResponse("missing user or token".to_owned())),
    };

    let identity = identity_from(user, submitted_email)?;
    Ok((identity, token.to_owned()))
}

fn has_id(value: &Value) -> bool {
    ["_id", "id"].iter().any(|key| value.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty()))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn identity_from(user: &Value, submitted_email: &str) -> Result<Identity, ClientError> {
    let id = str_field(user, "_id")
        .or_else(|| str_field(user, "id"))
        .ok_or_else(|| ClientError::InvalidAuthResponse("user has no id".to_owned()))?;
    let role_token =
        str_field(user, "role").ok_or_else(|| ClientError::InvalidAuthResponse("user has no role".to_owned()))?;
    let role = Role::from_str(role_token)
        .map_err(|_| ClientError::InvalidAuthResponse(format!("unknown role {role_token}")))?;
    let email = str_field(user, "email").unwrap_or(submitted_email);

    let identity = Identity::new(id, str_field(user, "name").unwrap_or_default(), email, role);
    if !identity.is_complete() {
        return Err(ClientError::InvalidAuthResponse("user has no email".to_owned()));
    }
    Ok(identity)
}

impl ApiClient {
    /// Validates the form, authenticates and starts a session.
    ///
    /// # Errors
    /// Returns [`ClientError::Validation`] before any network call when the
    /// input is invalid, or any request/parse error.
    pub async fn login(&self, input: &LoginInput) -> Result<Identity, ClientError> {
        input.validate()?;
        tracing::debug!(email = %input.email, "logging in");

        let response = self.post("/auth/login", &json!({ "email": input.email, "password": input.password })).await?;
        let (identity, token) = parse_auth_response(&response, &input.email)?;
        self.session.login(identity.clone(), token);
        Ok(identity)
    }

    /// Validates the form, creates the account and starts a session.
    ///
    /// # Errors
    /// Same as [`Self::login`].
    pub async fn register(&self, input: &RegisterInput) -> Result<Identity, ClientError> {
        input.validate()?;
        tracing::debug!(email = %input.email, role = %input.role, "registering");

        let body = json!({
            "name": input.name,
            "email": input.email,
            "password": input.password,
            "role": input.role.registration_token(),
        });
        let response = self.post("/auth/register", &body).await?;
        let (identity, token) = parse_auth_response(&response, &input.email)?;
        self.session.login(identity.clone(), token);
        Ok(identity)
    }

    /// Ends the local session. The API has no logout endpoint.
    pub fn logout(&self) {
        self.session.logout();
    }
}
