//! HTTP client for the bug-tracker API
//!
//! [`ApiClient`] wraps every endpoint, attaches the bearer credential held by
//! the shared [`SessionStore`] and clears that session on any 401.

#![allow(missing_docs, reason = "Field names mirror the wire format")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::let_underscore_must_use, reason = "Broadcast send fails only without subscribers")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod persistence;
pub mod session;

#[cfg(test)]
mod client_tests;

pub use auth::parse_auth_response;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use persistence::{FileSessionStore, MemorySessionStore, SessionPersistence, default_session_dir};
pub use session::{Session, SessionEvent, SessionStore};
