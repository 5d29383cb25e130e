//! Storage key names.
//!
//! These are the exact keys the site reads and writes, shared between the
//! admin panel, the maintenance gate and any storage engine.

use core::fmt;

/// A key in shared or session storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// `"true"` / `"false"`, shared across tabs.
    MaintenanceMode,
    /// Timestamp written on every toggle; change detection only.
    MaintenanceToggleTime,
    /// Optional overlay body text.
    MaintenanceMessage,
    /// JSON-encoded [`SiteSettings`](crate::SiteSettings).
    SiteSettings,
    /// Session-scoped admin token.
    AdminToken,
}

impl StorageKey {
    /// Keys whose change must re-evaluate the maintenance overlay.
    pub const MAINTENANCE_WATCH: [Self; 3] = [
        Self::MaintenanceMode,
        Self::MaintenanceToggleTime,
        Self::MaintenanceMessage,
    ];

    /// Returns the key as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaintenanceMode => "maintenanceMode",
            Self::MaintenanceToggleTime => "maintenanceToggleTime",
            Self::MaintenanceMessage => "maintenanceMessage",
            Self::SiteSettings => "siteSettings",
            Self::AdminToken => "adminToken",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maintenanceMode" => Ok(Self::MaintenanceMode),
            "maintenanceToggleTime" => Ok(Self::MaintenanceToggleTime),
            "maintenanceMessage" => Ok(Self::MaintenanceMessage),
            "siteSettings" => Ok(Self::SiteSettings),
            "adminToken" => Ok(Self::AdminToken),
            _ => Err(format!("unknown storage key: {s}")),
        }
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
