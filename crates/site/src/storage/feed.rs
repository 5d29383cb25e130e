//! Cross-tab change notification.
//!
//! Mirrors the browser `storage` event: a write made through one tab is
//! announced to every other tab of the origin, never to the writer itself, and
//! only when the stored value actually changed.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sinertis_core::StorageKey;
use tokio::sync::broadcast;
use tracing::{trace, warn};

use super::{KeyValueStore, StorageError};

/// Identifies one tab (page context) of the origin.
pub type TabId = u64;

/// Default number of buffered events per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// A change made to shared storage by some tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: TabId,
}

/// What a subscriber observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    /// A watched key changed in another tab.
    Changed(StorageEvent),
    /// The subscriber fell behind and this many events were dropped.
    Lagged(u64),
}

/// Broadcast channel carrying [`StorageEvent`]s between tabs.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<StorageEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Announce a change. Having no subscribers is not an error.
    pub fn publish(&self, event: StorageEvent) {
        trace!(key = %event.key, origin = event.origin, "Publishing storage event");
        let _ = self.tx.send(event);
    }

    /// Subscribe `listener` to changes of `keys` made by other tabs.
    #[must_use]
    pub fn subscribe(&self, keys: &[StorageKey], listener: TabId) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            keys: keys.iter().map(|k| k.as_str().to_owned()).collect(),
            listener,
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A filtered stream of changes for one tab.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<StorageEvent>,
    keys: HashSet<String>,
    listener: TabId,
}

impl Subscription {
    fn wants(&self, event: &StorageEvent) -> bool {
        event.origin != self.listener && self.keys.contains(&event.key)
    }

    /// Wait for the next relevant change.
    ///
    /// Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.wants(&event) => return Some(ChangeNotice::Changed(event)),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, listener = self.listener, "Storage subscriber lagged");
                    return Some(ChangeNotice::Lagged(missed));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Discard everything already queued, returning how many relevant
    /// notices were dropped.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.wants(&event) => dropped += 1,
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(_)) => dropped += 1,
                Err(_) => return dropped,
            }
        }
    }
}

/// One origin's shared storage: an engine plus its change feed.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    store: Arc<dyn KeyValueStore>,
    feed: ChangeFeed,
    next_tab: Arc<AtomicU64>,
}

impl SharedStorage {
    /// Wrap an engine.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            feed: ChangeFeed::default(),
            next_tab: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Open a new tab view with a fresh [`TabId`].
    #[must_use]
    pub fn open_tab(&self) -> TabStorage {
        TabStorage {
            shared: self.clone(),
            tab: self.next_tab.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The feed every tab publishes to.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

/// Shared storage as seen from one tab.
#[derive(Debug, Clone)]
pub struct TabStorage {
    shared: SharedStorage,
    tab: TabId,
}

impl TabStorage {
    #[must_use]
    pub const fn tab_id(&self) -> TabId {
        self.tab
    }

    /// Read a key.
    #[must_use]
    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.shared.store.get(key.as_str())
    }

    /// Write a key and notify the other tabs if the value changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot persist the write.
    pub fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let old_value = self.shared.store.set(key.as_str(), value)?;
        if old_value.as_deref() != Some(value) {
            self.announce(key, old_value, Some(value.to_owned()));
        }
        Ok(())
    }

    /// Remove a key and notify the other tabs if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot persist the removal.
    pub fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let old_value = self.shared.store.remove(key.as_str())?;
        if old_value.is_some() {
            self.announce(key, old_value, None);
        }
        Ok(())
    }

    /// Subscribe this tab to changes of `keys` made elsewhere.
    #[must_use]
    pub fn subscribe(&self, keys: &[StorageKey]) -> Subscription {
        self.shared.feed.subscribe(keys, self.tab)
    }

    fn announce(&self, key: StorageKey, old_value: Option<String>, new_value: Option<String>) {
        self.shared.feed.publish(StorageEvent {
            key: key.as_str().to_owned(),
            old_value,
            new_value,
            origin: self.tab,
        });
    }
}
