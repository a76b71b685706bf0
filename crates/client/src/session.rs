//! Process-wide record of who is logged in.
//!
//! One [`SessionStore`] is created at startup, wrapped in an `Arc` and handed to
//! every consumer. State changes go through `login`, `logout`, `expire` and
//! `restore`; readers always see live state.

use std::sync::{PoisonError, RwLock};

use bugdesk_core::Identity;
use bugdesk_core::constants::{LOGIN_REDIRECT, TOKEN_KEY, UNAUTHENTICATED_REDIRECT, USER_KEY};
use tokio::sync::broadcast;

use crate::error::ClientError;
use crate::persistence::{MemorySessionStore, SessionPersistence};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Identity and credential of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub credential: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.credential.is_some()
    }
}

/// Session transitions, broadcast to anyone who subscribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { identity: Identity },
    LoggedOut,
    /// A request came back 401. Consumers should send the user to `redirect_to`.
    Expired { redirect_to: &'static str },
}

pub struct SessionStore {
    state: RwLock<Session>,
    persistence: Box<dyn SessionPersistence>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.snapshot();
        f.debug_struct("SessionStore")
            .field("identity", &state.identity)
            .field("credential", &state.credential.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates an unauthenticated store. Call [`Self::restore`] to load
    /// persisted state.
    #[must_use]
    pub fn new(persistence: impl SessionPersistence + 'static) -> Self {
        let (events, _initial_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { state: RwLock::new(Session::default()), persistence: Box::new(persistence), events }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).identity.clone()
    }

    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).credential.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).is_authenticated()
    }

    /// Route guard for protected operations.
    ///
    /// # Errors
    /// Returns [`ClientError::NotAuthenticated`] when no session is active.
    pub fn require_identity(&self) -> Result<Identity, ClientError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match (&state.identity, &state.credential) {
            (Some(identity), Some(_)) => Ok(identity.clone()),
            _ => Err(ClientError::NotAuthenticated { redirect_to: UNAUTHENTICATED_REDIRECT }),
        }
    }

    /// Starts a session. Persistence failures are logged; the in-memory
    /// session stays valid for this run.
    pub fn login(&self, identity: Identity, credential: String) {
        tracing::info!(email = %identity.email_address, role = %identity.role, "logging in");
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.identity = Some(identity.clone());
            state.credential = Some(credential.clone());
        }

        match serde_json::to_string(&identity) {
            Ok(encoded) => {
                if let Err(e) = self.persistence.write(USER_KEY, &encoded) {
                    tracing::error!(error = %e, "failed to persist identity");
                }
            },
            Err(e) => tracing::error!(error = %e, "failed to encode identity"),
        }
        if let Err(e) = self.persistence.write(TOKEN_KEY, &credential) {
            tracing::error!(error = %e, "failed to persist credential");
        }

        let _ = self.events.send(SessionEvent::LoggedIn { identity });
    }

    /// Ends the session. Safe to call when already logged out.
    pub fn logout(&self) {
        tracing::info!("logging out");
        self.clear();
        let _ = self.events.send(SessionEvent::LoggedOut);
    }

    /// Ends the session after an authorization failure and signals the
    /// redirect to the login entry point.
    pub fn expire(&self) {
        tracing::warn!("session expired, clearing credentials");
        self.clear();
        let _ = self.events.send(SessionEvent::Expired { redirect_to: LOGIN_REDIRECT });
    }

    /// Loads persisted state once at startup.
    ///
    /// A malformed identity, an empty credential, or only one of the two
    /// entries being present discards both entries. Returns whether a session
    /// was restored.
    pub fn restore(&self) -> bool {
        let user = self.read_entry(USER_KEY);
        let token = self.read_entry(TOKEN_KEY);

        match (user, token) {
            (None, None) => {
                tracing::debug!("no stored credentials found");
                false
            },
            (Some(raw_user), Some(token)) if !token.trim().is_empty() => {
                match Identity::from_persisted(&raw_user) {
                    Some(identity) => {
                        tracing::debug!(email = %identity.email_address, "restored stored credentials");
                        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                        state.identity = Some(identity);
                        state.credential = Some(token.trim().to_owned());
                        true
                    },
                    None => {
                        tracing::warn!("stored identity is invalid, clearing");
                        self.clear();
                        false
                    },
                }
            },
            _ => {
                tracing::warn!("stored session is incomplete, clearing");
                self.clear();
                false
            },
        }
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        match self.persistence.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read stored session entry");
                None
            },
        }
    }

    fn clear(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = Session::default();
        }
        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.persistence.remove(key) {
                tracing::error!(key, error = %e, "failed to remove stored session entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::FileSessionStore;
    use bugdesk_core::Role;
    use std::io;
    use tempfile::TempDir;

    fn identity() -> Identity {
        Identity::new("u1", "Ada", "ada@example.com", Role::Tester)
    }

    struct BrokenDisk;

    impl SessionPersistence for BrokenDisk {
        fn read(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::other("disk on fire"))
        }
        fn write(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
        fn remove(&self, _key: &str) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_login_then_restore_in_new_process() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(FileSessionStore::new(dir.path()));
        store.login(identity(), "tok-1".to_owned());
        assert!(store.is_authenticated());

        let reloaded = SessionStore::new(FileSessionStore::new(dir.path()));
        assert!(!reloaded.is_authenticated());
        assert!(reloaded.restore());
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.identity(), Some(identity()));
        assert_eq!(reloaded.credential().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_logout_is_idempotent_and_clears_disk() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(FileSessionStore::new(dir.path()));
        store.login(identity(), "tok".to_owned());
        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
        assert!(!dir.path().join("user").exists());
        assert!(!dir.path().join("token").exists());

        let reloaded = SessionStore::new(FileSessionStore::new(dir.path()));
        assert!(!reloaded.restore());
    }

    #[test]
    fn test_restore_discards_malformed_identity() {
        let dir = TempDir::new().unwrap();
        let disk = FileSessionStore::new(dir.path());
        disk.write("user", r#"{"_id":"u1","role":"ADMIN"}"#).unwrap();
        disk.write("token", "tok").unwrap();

        let store = SessionStore::new(FileSessionStore::new(dir.path()));
        assert!(!store.restore());
        assert!(!store.is_authenticated());
        assert_eq!(disk.read("user").unwrap(), None);
        assert_eq!(disk.read("token").unwrap(), None);
    }

    #[test]
    fn test_restore_discards_partial_state() {
        let dir = TempDir::new().unwrap();
        let disk = FileSessionStore::new(dir.path());
        disk.write("token", "orphan").unwrap();

        let store = SessionStore::new(FileSessionStore::new(dir.path()));
        assert!(!store.restore());
        assert_eq!(disk.read("token").unwrap(), None);
    }

    #[test]
    fn test_persistence_failure_keeps_in_memory_session() {
        let store = SessionStore::new(BrokenDisk);
        store.login(identity(), "tok".to_owned());
        assert!(store.is_authenticated());
        assert!(!store.restore());
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_expire_clears_and_signals_redirect() {
        let store = SessionStore::in_memory();
        store.login(identity(), "tok".to_owned());
        let mut rx = store.subscribe();
        store.expire();
        assert!(!store.is_authenticated());
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Expired { redirect_to: "/login?expired=true" });
    }

    #[test]
    fn test_require_identity_guard() {
        let store = SessionStore::in_memory();
        assert!(matches!(
            store.require_identity(),
            Err(ClientError::NotAuthenticated { redirect_to: "/" })
        ));
        store.login(identity(), "tok".to_owned());
        assert_eq!(store.require_identity().unwrap(), identity());
    }

    #[test]
    fn test_debug_masks_credential() {
        let store = SessionStore::in_memory();
        store.login(identity(), "super-secret".to_owned());
        assert!(!format!("{store:?}").contains("super-secret"));
    }
}
