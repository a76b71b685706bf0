//! Shared constants for bugdesk.

/// Base URL used when `BUGDESK_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default stats auto-refresh interval in milliseconds.
pub const DEFAULT_STATS_INTERVAL_MS: i64 = 5000;

/// Login entry point signalled when a request comes back 401.
pub const LOGIN_REDIRECT: &str = "/login?expired=true";

/// Landing page unauthenticated users are sent to by route guards.
pub const UNAUTHENTICATED_REDIRECT: &str = "/";

/// Persisted key holding the JSON-encoded identity.
pub const USER_KEY: &str = "user";

/// Persisted key holding the raw bearer credential.
pub const TOKEN_KEY: &str = "token";

/// Error bodies longer than this are truncated in log output.
pub const MAX_LOGGED_BODY_LEN: usize = 500;

/// Minimum password length accepted by login and registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration name length bounds (inclusive).
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 100;
