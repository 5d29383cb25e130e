//! Client storage engines and the cross-tab change feed.
//!
//! The site keeps all of its state in two key/value scopes:
//!
//! - **shared storage** - one per origin, survives restarts, visible to every
//!   tab. Holds the maintenance flag, message, toggle time and site settings.
//! - **session storage** - one per tab, dropped with it. Holds the admin token.
//!
//! Engines implement [`KeyValueStore`]. Cross-tab notification is not a
//! property of an engine: [`SharedStorage`] pairs any engine with a
//! [`ChangeFeed`] and hands out per-tab [`TabStorage`] views whose writes are
//! announced to every other tab.

mod feed;
mod file;
mod memory;
mod session;

use thiserror::Error;

pub use feed::{ChangeFeed, ChangeNotice, SharedStorage, StorageEvent, Subscription, TabId, TabStorage};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::SessionStore;

/// Errors raised by storage engines.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string-keyed, string-valued store with browser storage semantics.
///
/// Reads never fail; engines that persist keep an in-memory copy and only
/// mutations touch the backing medium.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Get the value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot persist the write.
    fn set(&self, key: &str, value: &str) -> Result<Option<String>, StorageError>;

    /// Remove `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot persist the removal.
    fn remove(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// All keys currently present, sorted.
    fn keys(&self) -> Vec<String>;
}
