//! In-memory storage engine.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{KeyValueStore, StorageError};

/// An in-memory store backed by a `HashMap`.
///
/// Clones share the same data, which is how several tabs of one origin see the
/// same shared storage in tests. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<Option<String>, StorageError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        Ok(data.insert(key.to_owned(), value.to_owned()))
    }

    fn remove(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        Ok(data.remove(key))
    }

    fn keys(&self) -> Vec<String> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = data.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_previous() {
        let store = MemoryStore::new();
        assert_eq!(store.set("maintenanceMode", "true").unwrap(), None);
        assert_eq!(
            store.set("maintenanceMode", "false").unwrap(),
            Some("true".to_owned())
        );
        assert_eq!(store.get("maintenanceMode").as_deref(), Some("false"));
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        store.set("adminToken", "authenticated").unwrap();
        assert_eq!(
            store.remove("adminToken").unwrap(),
            Some("authenticated".to_owned())
        );
        assert_eq!(store.get("adminToken"), None);
        assert_eq!(store.remove("adminToken").unwrap(), None);
    }

    #[test]
    fn test_clones_share_data() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("siteSettings", "{}").unwrap();
        assert_eq!(b.get("siteSettings").as_deref(), Some("{}"));
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.set("b", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.keys(), vec!["a".to_owned(), "b".to_owned()]);
    }
}
