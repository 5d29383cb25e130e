//! Integration tests for the Sinertis Studio site.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sinertis-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cross_tab_sync` - admin writes reaching visitor tabs through the gate
//! - `transport_chain` - tier resolution and delivery against a mock provider
//!
//! Shared fixtures live here.

use std::sync::Arc;

use secrecy::SecretString;
use sinertis_site::admin::AdminPanel;
use sinertis_site::maintenance::{HeadlessDocument, MaintenanceGate, PageContext};
use sinertis_site::storage::{SessionStore, SharedStorage, TabStorage};

/// Admin password used by fixtures.
pub const ADMIN_PASSWORD: &str = "Sn7!qK2#vT9pLm";

/// One open browser tab: its storage view, session, document and gate.
pub struct TestTab {
    pub storage: TabStorage,
    pub session: SessionStore,
    pub document: HeadlessDocument,
    pub gate: Arc<MaintenanceGate>,
}

impl TestTab {
    /// Open a tab on `path` against `shared`.
    #[must_use]
    pub fn open(shared: &SharedStorage, path: &str) -> Self {
        let storage = shared.open_tab();
        let session = SessionStore::new();
        let document = HeadlessDocument::default();
        let gate = Arc::new(MaintenanceGate::new(
            storage.clone(),
            session.clone(),
            PageContext::new(path),
            Arc::new(document.clone()),
        ));
        Self {
            storage,
            session,
            document,
            gate,
        }
    }

    /// Admin panel bound to this tab's storage and session.
    #[must_use]
    pub fn admin_panel(&self) -> AdminPanel {
        AdminPanel::new(
            self.storage.clone(),
            self.session.clone(),
            SecretString::from(ADMIN_PASSWORD),
        )
    }
}
