//! The maintenance gate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use askama::Template;
use sinertis_core::{MaintenanceFlag, StorageKey};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};

use super::animation::{InkTrail, TrailInput};
use super::overlay::MaintenanceOverlay;
use super::page::PageContext;
use super::surface::{Surface, Viewport};
use crate::storage::{ChangeNotice, SessionStore, TabStorage};

/// Delay between a storage change and re-evaluation, letting the writer
/// finish its group of key writes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Whether the overlay is on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    OverlayAbsent,
    OverlayPresent,
}

/// Decides whether a tab is blocked by the maintenance overlay.
///
/// One gate per tab. [`evaluate`](Self::evaluate) and
/// [`teardown`](Self::teardown) are idempotent; at most one overlay node is
/// ever mounted. The overlay's [`InkTrail`] only runs when `evaluate` is
/// called inside a tokio runtime.
pub struct MaintenanceGate {
    storage: TabStorage,
    session: SessionStore,
    page: PageContext,
    surface: Arc<dyn Surface>,
    debounce: Duration,
    trail: Mutex<Option<InkTrail>>,
}

impl std::fmt::Debug for MaintenanceGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceGate")
            .field("tab", &self.storage.tab_id())
            .field("page", &self.page)
            .field("debounce", &self.debounce)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl MaintenanceGate {
    #[must_use]
    pub fn new(
        storage: TabStorage,
        session: SessionStore,
        page: PageContext,
        surface: Arc<dyn Surface>,
    ) -> Self {
        Self {
            storage,
            session,
            page,
            surface,
            debounce: DEFAULT_DEBOUNCE,
            trail: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    fn trail(&self) -> MutexGuard<'_, Option<InkTrail>> {
        self.trail.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current overlay state as seen on the surface.
    #[must_use]
    pub fn state(&self) -> GateState {
        if self.surface.has_overlay() {
            GateState::OverlayPresent
        } else {
            GateState::OverlayAbsent
        }
    }

    /// The visibility rule: maintenance on, visitor not admin, page not admin.
    #[must_use]
    pub fn should_block(&self) -> bool {
        let flag =
            MaintenanceFlag::from_stored(self.storage.get(StorageKey::MaintenanceMode).as_deref());
        let authenticated = self.session.is_authenticated();
        let admin_page = self.page.is_admin_page();

        debug!(
            maintenance = %flag,
            authenticated,
            admin_page,
            "Maintenance gate inputs"
        );
        if flag.is_on() && (authenticated || admin_page) {
            debug!(authenticated, admin_page, "Maintenance on, overlay suppressed");
        }

        flag.is_on() && !authenticated && !admin_page
    }

    /// Show the overlay if the visibility rule holds and none is mounted.
    ///
    /// Never removes an existing overlay; [`teardown`](Self::teardown) does.
    #[instrument(skip(self), fields(tab = self.storage.tab_id(), page = %self.page.path()))]
    pub fn evaluate(&self) -> GateState {
        if !self.should_block() {
            return self.state();
        }

        let mut trail = self.trail();
        if self.surface.has_overlay() {
            trace!("Overlay already mounted");
            return GateState::OverlayPresent;
        }

        let markup = match MaintenanceOverlay::from_storage(&self.storage).render() {
            Ok(markup) => markup,
            Err(e) => {
                error!(error = %e, "Failed to render maintenance overlay");
                return GateState::OverlayAbsent;
            }
        };

        self.surface.mount_overlay(markup);
        self.surface.set_scroll_locked(true);
        *trail = if tokio::runtime::Handle::try_current().is_ok() {
            Some(InkTrail::start(self.surface.canvas(), self.surface.viewport()))
        } else {
            warn!("No async runtime, overlay shown without ink trail");
            None
        };

        info!("Maintenance overlay shown");
        GateState::OverlayPresent
    }

    /// Remove the overlay, stop its animation and restore scrolling.
    ///
    /// Returns whether an overlay was removed.
    pub fn teardown(&self) -> bool {
        let mut trail = self.trail();
        drop(trail.take());

        let removed = self.surface.unmount_overlay();
        if removed {
            self.surface.set_scroll_locked(false);
            info!(tab = self.storage.tab_id(), "Maintenance overlay removed");
        }
        removed
    }

    fn refresh(&self) -> GateState {
        self.teardown();
        self.evaluate()
    }

    /// React to a storage change notification for `key`.
    ///
    /// Keys outside the maintenance set are ignored and return `None`.
    /// Otherwise waits out the debounce, removes any overlay and re-evaluates.
    pub async fn on_storage_change(&self, key: &str) -> Option<GateState> {
        if !StorageKey::MAINTENANCE_WATCH
            .iter()
            .any(|watched| watched.as_str() == key)
        {
            trace!(key, "Ignoring storage change");
            return None;
        }

        tokio::time::sleep(self.debounce).await;
        Some(self.refresh())
    }

    /// Forward a pointer move to the ink trail, if the overlay is up.
    pub fn pointer_moved(&self, x: f64, y: f64) {
        if let Some(trail) = self.trail().as_ref() {
            trail.send(TrailInput::PointerMoved { x, y });
        }
    }

    /// Forward a viewport resize to the ink trail, if the overlay is up.
    pub fn viewport_resized(&self, viewport: Viewport) {
        if let Some(trail) = self.trail().as_ref() {
            trail.send(TrailInput::Resized(viewport));
        }
    }

    /// Whether the ink-trail loop is currently running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.trail().as_ref().is_some_and(InkTrail::is_running)
    }

    /// Follow maintenance changes made in other tabs.
    ///
    /// The subscription is taken before this returns, so no change made after
    /// the call is missed. Bursts of changes inside one debounce window cause a
    /// single re-evaluation.
    #[must_use]
    pub fn watch(self: &Arc<Self>) -> GateWatcher {
        let mut subscription = self.storage.subscribe(&StorageKey::MAINTENANCE_WATCH);
        let gate = Arc::clone(self);

        let task = tokio::spawn(async move {
            while let Some(notice) = subscription.recv().await {
                if let ChangeNotice::Changed(event) = &notice {
                    debug!(key = %event.key, origin = event.origin, "Maintenance keys changed");
                }

                tokio::time::sleep(gate.debounce).await;
                let coalesced = subscription.drain();
                let state = gate.refresh();
                debug!(coalesced, ?state, "Maintenance gate re-evaluated");
            }
        });

        GateWatcher { task }
    }
}

/// Handle to the task started by [`MaintenanceGate::watch`]. Dropping it stops
/// the task.
#[derive(Debug)]
pub struct GateWatcher {
    task: JoinHandle<()>,
}

impl GateWatcher {
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for GateWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::maintenance::HeadlessDocument;
    use crate::maintenance::animation::FRAME_INTERVAL;
    use crate::storage::{MemoryStore, SharedStorage};

    struct Tab {
        storage: TabStorage,
        session: SessionStore,
        doc: HeadlessDocument,
        gate: Arc<MaintenanceGate>,
    }

    fn open_tab(shared: &SharedStorage, path: &str) -> Tab {
        let storage = shared.open_tab();
        let session = SessionStore::new();
        let doc = HeadlessDocument::default();
        let gate = Arc::new(MaintenanceGate::new(
            storage.clone(),
            session.clone(),
            PageContext::new(path),
            Arc::new(doc.clone()),
        ));
        Tab {
            storage,
            session,
            doc,
            gate,
        }
    }

    fn shared() -> SharedStorage {
        SharedStorage::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_visibility_truth_table() {
        for flag in [false, true] {
            for authenticated in [false, true] {
                for admin_page in [false, true] {
                    let shared = shared();
                    let path = if admin_page { "/admin.html" } else { "/services.html" };
                    let tab = open_tab(&shared, path);
                    tab.storage
                        .set(StorageKey::MaintenanceMode, MaintenanceFlag::from(flag).as_stored())
                        .unwrap();
                    if authenticated {
                        tab.session.mark_authenticated().unwrap();
                    }

                    let state = tab.gate.evaluate();

                    let expected = flag && !authenticated && !admin_page;
                    assert_eq!(
                        state == GateState::OverlayPresent,
                        expected,
                        "flag={flag} authenticated={authenticated} admin_page={admin_page}"
                    );
                    assert_eq!(tab.doc.overlay_count(), usize::from(expected));
                    assert_eq!(tab.doc.is_scroll_locked(), expected);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_evaluate_twice_mounts_one_overlay() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        tab.storage.set(StorageKey::MaintenanceMode, "true").unwrap();

        assert_eq!(tab.gate.evaluate(), GateState::OverlayPresent);
        assert_eq!(tab.gate.evaluate(), GateState::OverlayPresent);

        assert_eq!(tab.doc.overlay_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_flag_means_open() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        assert_eq!(tab.gate.evaluate(), GateState::OverlayAbsent);
        assert!(!tab.gate.is_animating());
    }

    #[tokio::test]
    async fn test_overlay_uses_stored_message() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        tab.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        tab.storage
            .set(StorageKey::MaintenanceMessage, "Nouvelle version ce soir")
            .unwrap();

        tab.gate.evaluate();

        assert!(
            tab.doc
                .overlay_markup()
                .unwrap()
                .contains("Nouvelle version ce soir")
        );
    }

    #[test]
    fn test_evaluate_outside_runtime_mounts_without_trail() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        tab.storage.set(StorageKey::MaintenanceMode, "true").unwrap();

        assert_eq!(tab.gate.evaluate(), GateState::OverlayPresent);

        assert_eq!(tab.doc.overlay_count(), 1);
        assert!(tab.doc.is_scroll_locked());
        assert!(!tab.gate.is_animating());
        assert!(tab.gate.teardown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_rebinds_canvas_and_keeps_particles() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        tab.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        tab.gate.evaluate();
        tokio::time::sleep(FRAME_INTERVAL).await;
        assert_eq!(tab.doc.canvas_viewport(), Some(tab.doc.viewport()));

        for i in 0..30 {
            tab.gate.pointer_moved(100.0 + f64::from(i), 200.0);
        }
        tokio::time::sleep(FRAME_INTERVAL * 2).await;
        let before = tab.doc.circles_drawn();
        assert!(before > 0);

        let resized = Viewport::new(1920, 1080);
        tab.doc.set_viewport(resized);
        tab.gate.viewport_resized(resized);
        tokio::time::sleep(FRAME_INTERVAL * 3).await;

        assert_eq!(tab.doc.canvas_viewport(), Some(resized));
        assert!(tab.gate.is_animating());
        assert!(tab.doc.circles_drawn() > before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_animation_and_unlocks_scroll() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        tab.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        tab.gate.evaluate();
        tokio::time::sleep(FRAME_INTERVAL * 5).await;
        assert!(tab.gate.is_animating());
        assert!(tab.doc.frames_drawn() > 0);

        assert!(tab.gate.teardown());
        tokio::task::yield_now().await;
        let frames = tab.doc.frames_drawn();
        tokio::time::sleep(FRAME_INTERVAL * 20).await;

        assert!(!tab.gate.is_animating());
        assert_eq!(tab.doc.frames_drawn(), frames);
        assert!(!tab.doc.is_scroll_locked());
        assert!(!tab.gate.teardown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_storage_change_ignores_other_keys() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        assert_eq!(tab.gate.on_storage_change("siteSettings").await, None);
        assert_eq!(tab.gate.on_storage_change("theme").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_storage_change_rebuilds_overlay() {
        let shared = shared();
        let tab = open_tab(&shared, "/index.html");
        tab.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        tab.gate.evaluate();

        tab.storage
            .set(StorageKey::MaintenanceMessage, "Bientôt")
            .unwrap();
        let state = tab.gate.on_storage_change("maintenanceMessage").await;

        assert_eq!(state, Some(GateState::OverlayPresent));
        assert_eq!(tab.doc.overlay_count(), 1);
        assert!(tab.doc.overlay_markup().unwrap().contains("Bientôt"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_removes_overlay_when_other_tab_disables() {
        let shared = shared();
        let visitor = open_tab(&shared, "/index.html");
        let admin = open_tab(&shared, "/admin.html");
        admin.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        visitor.gate.evaluate();
        let _watcher = visitor.gate.watch();

        admin.storage.set(StorageKey::MaintenanceMode, "false").unwrap();
        tokio::time::sleep(DEFAULT_DEBOUNCE / 2).await;
        assert_eq!(visitor.doc.overlay_count(), 1);

        tokio::time::sleep(DEFAULT_DEBOUNCE).await;
        assert_eq!(visitor.doc.overlay_count(), 0);
        assert!(!visitor.gate.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_coalesces_a_burst_of_writes() {
        let shared = shared();
        let visitor = open_tab(&shared, "/index.html");
        let admin = open_tab(&shared, "/admin.html");
        let _watcher = visitor.gate.watch();

        admin.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        admin
            .storage
            .set(StorageKey::MaintenanceMessage, "Mise à jour")
            .unwrap();
        admin
            .storage
            .set(StorageKey::MaintenanceToggleTime, "2026-10-19T10:00:00Z")
            .unwrap();
        tokio::time::sleep(DEFAULT_DEBOUNCE * 3).await;

        assert_eq!(visitor.doc.overlay_count(), 1);
        assert!(visitor.doc.overlay_markup().unwrap().contains("Mise à jour"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_watcher_stops_following() {
        let shared = shared();
        let visitor = open_tab(&shared, "/index.html");
        let admin = open_tab(&shared, "/admin.html");
        let watcher = visitor.gate.watch();
        assert!(watcher.is_running());
        drop(watcher);

        admin.storage.set(StorageKey::MaintenanceMode, "true").unwrap();
        tokio::time::sleep(DEFAULT_DEBOUNCE * 3).await;

        assert_eq!(visitor.doc.overlay_count(), 0);
    }
}
