//! Session store for the guard portal client
//!
//! Holds the authentication token and account email of the signed-in guard.
//! Every screen reads the session through a shared [`SessionStore`]; only the
//! login and logout flows (and an authentication-rejected response) write it.

mod storage;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors raised by the session store
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session token must not be empty")]
    EmptyToken,

    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// The authenticated identity of the current guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token issued by the backend at login
    pub token: String,

    /// Email of the signed-in guard account
    pub account_email: String,
}

impl Session {
    pub fn new(token: impl Into<String>, account_email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            account_email: account_email.into(),
        }
    }

    /// A session is only usable for authorized calls with a non-empty token
    pub fn is_usable(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// Shared, persistent holder of the current [`Session`]
///
/// Cloning is cheap; all clones observe the same session.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionStore {
    /// Create a store backed by `storage`, restoring any persisted session
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        let restored = match storage.load() {
            Ok(session) => session.filter(Session::is_usable),
            Err(err) => {
                warn!("Discarding unreadable persisted session: {}", err);
                None
            }
        };

        if restored.is_some() {
            debug!("Restored persisted guard session");
        }

        Self {
            current: Arc::new(RwLock::new(restored)),
            storage: Arc::new(storage),
        }
    }

    /// A store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Current session, or `None` when unauthenticated
    pub fn get(&self) -> Option<Session> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone().filter(Session::is_usable)
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.get().map(|session| session.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// Store a new session and persist it until [`clear`](Self::clear)
    pub fn set(&self, session: Session) -> Result<()> {
        if !session.is_usable() {
            return Err(SessionError::EmptyToken);
        }

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.save(&session)?;
        debug!("Stored session for {}", session.account_email);
        *guard = Some(session);
        Ok(())
    }

    /// Drop the session entirely
    ///
    /// The in-memory session is removed under the same write lock that
    /// removes the persisted copy, so readers see either the whole session or
    /// nothing. The in-memory copy is cleared even if the storage fails.
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = guard.take();
        if let Some(session) = &previous {
            debug!("Clearing session for {}", session.account_email);
        }
        self.storage.remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = SessionStore::in_memory();
        assert!(store.get().is_none());

        store.set(Session::new("tok", "guard@example.com")).unwrap();

        let session = store.get().unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.account_email, "guard@example.com");
    }

    #[test]
    fn test_empty_token_rejected() {
        let store = SessionStore::in_memory();
        let result = store.set(Session::new("  ", "guard@example.com"));
        assert!(matches!(result, Err(SessionError::EmptyToken)));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_is_visible_to_clones() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set(Session::new("tok", "guard@example.com")).unwrap();
        assert!(other.is_authenticated());

        other.clear().unwrap();
        assert!(store.get().is_none());
        assert!(store.token().is_none());
    }
}
