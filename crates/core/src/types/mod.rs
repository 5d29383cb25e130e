//! Core types for the Sinertis site.
//!
//! This module provides type-safe wrappers for the values the site keeps in
//! client storage, plus the email address type shared by the contact form and
//! the transport chain.

pub mod email;
pub mod flags;
pub mod keys;
pub mod settings;

pub use email::{Email, EmailError};
pub use flags::{AuthSession, MaintenanceFlag};
pub use keys::StorageKey;
pub use settings::SiteSettings;
