//! Per-tab session storage and the admin authentication predicate.

use sinertis_core::{AuthSession, StorageKey};

use super::{KeyValueStore, MemoryStore, StorageError};

/// Session storage for one tab.
///
/// Holds the admin token. Dropping the last clone ends the session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    store: MemoryStore,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current authentication state.
    #[must_use]
    pub fn auth(&self) -> AuthSession {
        AuthSession::from_stored(self.store.get(StorageKey::AdminToken.as_str()).as_deref())
    }

    /// Whether an administrator is logged in for this session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth().is_authenticated()
    }

    pub(crate) fn mark_authenticated(&self) -> Result<(), StorageError> {
        self.store
            .set(StorageKey::AdminToken.as_str(), AuthSession::TOKEN)
            .map(|_| ())
    }

    pub(crate) fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(StorageKey::AdminToken.as_str()).map(|_| ())
    }
}
