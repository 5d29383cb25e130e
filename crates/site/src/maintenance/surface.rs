//! The document the gate draws on.
//!
//! [`Surface`] is the slice of the page the maintenance gate touches: one
//! overlay node, the body scroll lock, the viewport size, and a canvas for the
//! ink trail. [`HeadlessDocument`] is an in-process implementation used by the
//! CLI preview and by tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::ink::Rgba;

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// A 2D drawing target for the ink trail.
pub trait Canvas: Send {
    /// Re-bind the canvas to new dimensions.
    fn resize(&mut self, viewport: Viewport);

    /// Paint the whole canvas with a translucent colour.
    fn fade(&mut self, color: Rgba);

    /// Fill a circle.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);
}

/// The page surface the maintenance gate mounts its overlay on.
pub trait Surface: Send + Sync {
    /// Whether an overlay node is currently mounted.
    fn has_overlay(&self) -> bool;

    /// Mount the overlay node.
    fn mount_overlay(&self, markup: String);

    /// Remove the overlay node, returning whether one was mounted.
    fn unmount_overlay(&self) -> bool;

    /// Block or restore page scrolling.
    fn set_scroll_locked(&self, locked: bool);

    fn viewport(&self) -> Viewport;

    /// A canvas covering the overlay.
    fn canvas(&self) -> Box<dyn Canvas>;
}

#[derive(Debug, Default)]
struct DocumentState {
    overlays: Vec<String>,
    scroll_locked: bool,
    viewport: Viewport,
    canvas_viewport: Option<Viewport>,
}

/// An in-memory document.
///
/// Clones share state. Overlay nodes are kept as a list so a duplicate mount
/// is observable rather than silently replacing the first one.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDocument {
    state: Arc<Mutex<DocumentState>>,
    frames: Arc<AtomicU64>,
    circles: Arc<AtomicU64>,
}

impl HeadlessDocument {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let doc = Self::default();
        doc.lock().viewport = viewport;
        doc
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of overlay nodes currently mounted.
    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.lock().overlays.len()
    }

    /// Markup of the mounted overlay, if any.
    #[must_use]
    pub fn overlay_markup(&self) -> Option<String> {
        self.lock().overlays.first().cloned()
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.lock().scroll_locked
    }

    /// Change the viewport as a window resize would.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.lock().viewport = viewport;
    }

    /// Dimensions the most recent canvas was last bound to.
    #[must_use]
    pub fn canvas_viewport(&self) -> Option<Viewport> {
        self.lock().canvas_viewport
    }

    /// Frames painted on any canvas handed out by this document.
    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Particles painted on any canvas handed out by this document.
    #[must_use]
    pub fn circles_drawn(&self) -> u64 {
        self.circles.load(Ordering::Relaxed)
    }
}

impl Surface for HeadlessDocument {
    fn has_overlay(&self) -> bool {
        !self.lock().overlays.is_empty()
    }

    fn mount_overlay(&self, markup: String) {
        self.lock().overlays.push(markup);
    }

    fn unmount_overlay(&self) -> bool {
        let mut state = self.lock();
        let had = !state.overlays.is_empty();
        state.overlays.clear();
        had
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.lock().scroll_locked = locked;
    }

    fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    fn canvas(&self) -> Box<dyn Canvas> {
        Box::new(CountingCanvas {
            state: Arc::clone(&self.state),
            frames: Arc::clone(&self.frames),
            circles: Arc::clone(&self.circles),
        })
    }
}

/// Canvas that only counts what would have been painted.
#[derive(Debug)]
struct CountingCanvas {
    state: Arc<Mutex<DocumentState>>,
    frames: Arc<AtomicU64>,
    circles: Arc<AtomicU64>,
}

impl Canvas for CountingCanvas {
    fn resize(&mut self, viewport: Viewport) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canvas_viewport = Some(viewport);
    }

    fn fade(&mut self, _color: Rgba) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64, _color: Rgba) {
        self.circles.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_and_unmount() {
        let doc = HeadlessDocument::default();
        assert!(!doc.has_overlay());

        doc.mount_overlay("<div></div>".to_owned());
        assert_eq!(doc.overlay_count(), 1);
        assert!(doc.unmount_overlay());
        assert!(!doc.unmount_overlay());
        assert_eq!(doc.overlay_count(), 0);
    }

    #[test]
    fn test_canvas_counts_frames() {
        let doc = HeadlessDocument::new(Viewport::new(800, 600));
        let mut canvas = doc.canvas();
        canvas.fade(Rgba::new(0, 0, 0, 0.1));
        canvas.fill_circle(1.0, 1.0, 2.0, Rgba::new(255, 0, 0, 0.5));
        assert_eq!(doc.frames_drawn(), 1);
        assert_eq!(doc.circles_drawn(), 1);
    }

    #[test]
    fn test_canvas_resize_is_recorded() {
        let doc = HeadlessDocument::new(Viewport::new(800, 600));
        let mut canvas = doc.canvas();
        assert_eq!(doc.canvas_viewport(), None);

        canvas.resize(Viewport::new(1024, 768));

        assert_eq!(doc.canvas_viewport(), Some(Viewport::new(1024, 768)));
        assert_eq!(doc.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn test_viewport_center() {
        assert_eq!(Viewport::new(800, 600).center(), (400.0, 300.0));
    }
}
