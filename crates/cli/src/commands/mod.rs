pub(crate) mod auth;
pub(crate) mod bugs;
pub(crate) mod projects;
pub(crate) mod stats;

use std::sync::Arc;

use anyhow::{Context, Result};
use bugdesk_client::{ApiClient, SessionStore};
use bugdesk_core::Identity;
use serde::Serialize;

/// Shared handles for every command.
pub(crate) struct App {
    pub session: Arc<SessionStore>,
    pub client: Arc<ApiClient>,
}

impl App {
    pub(crate) fn require_login(&self) -> Result<Identity> {
        self.session.require_identity().context("run `bugdesk login` first")
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
