//! Maintenance mode.
//!
//! While the shared `maintenanceMode` flag is `"true"`, every page except the
//! admin page is covered by a full-screen overlay for visitors who are not
//! logged in as admin. The overlay carries an ink-trail animation that follows
//! the pointer. Changes made in another tab are picked up through the storage
//! change feed after a short debounce.
//!
//! # Modules
//!
//! - `gate` - the show/hide decision and cross-tab re-evaluation
//! - `overlay` - overlay markup (Askama template)
//! - `ink` / `animation` - particle simulation and its frame loop
//! - `surface` - the document abstraction the gate mounts onto
//! - `page` - page identity

pub mod animation;
mod gate;
pub mod ink;
mod overlay;
mod page;
pub mod surface;

pub use animation::{InkTrail, TrailInput};
pub use gate::{DEFAULT_DEBOUNCE, GateState, GateWatcher, MaintenanceGate};
pub use overlay::{DEFAULT_MESSAGE, MaintenanceOverlay};
pub use page::{ADMIN_PAGE, PageContext};
pub use surface::{Canvas, HeadlessDocument, Surface, Viewport};
