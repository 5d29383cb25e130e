//! Maintenance overlay markup.

use askama::Template;
use sinertis_core::{SiteSettings, StorageKey};

use super::page::ADMIN_PAGE;
use crate::storage::TabStorage;

/// Body text used when no custom message is stored.
pub const DEFAULT_MESSAGE: &str =
    "Le site est temporairement indisponible pour maintenance. Nous serons bientôt de retour!";

/// The full-screen overlay shown while maintenance is on.
///
/// Values are HTML-escaped by the template.
#[derive(Debug, Clone, PartialEq, Eq, Template)]
#[template(path = "maintenance_overlay.html")]
pub struct MaintenanceOverlay {
    pub title: String,
    pub message: String,
    pub settings: SiteSettings,
    pub admin_href: String,
}

impl MaintenanceOverlay {
    /// Build the overlay from what is currently in shared storage.
    ///
    /// An empty stored message counts as absent.
    #[must_use]
    pub fn from_storage(storage: &TabStorage) -> Self {
        let settings = SiteSettings::from_stored(storage.get(StorageKey::SiteSettings).as_deref());
        let message = storage
            .get(StorageKey::MaintenanceMessage)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_owned());

        Self {
            title: "Maintenance en cours".to_owned(),
            message,
            settings,
            admin_href: ADMIN_PAGE.to_owned(),
        }
    }
}
