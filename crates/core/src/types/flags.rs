//! Boolean flags kept in client storage.

use serde::{Deserialize, Serialize};

/// Admin authentication state for one browsing session.
///
/// Stored under [`StorageKey::AdminToken`](crate::StorageKey::AdminToken) in
/// session storage. Anything other than the exact token value, including an
/// absent key, means the visitor is not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthSession {
    #[default]
    Anonymous,
    Authenticated,
}

impl AuthSession {
    /// Value written to session storage on login.
    pub const TOKEN: &'static str = "authenticated";

    /// Interpret a raw session-storage value.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(Self::TOKEN) => Self::Authenticated,
            _ => Self::Anonymous,
        }
    }

    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Site-wide maintenance switch.
///
/// Only the exact string `"true"` enables maintenance; a missing key,
/// `"false"` or any other value leaves the site open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceFlag {
    #[default]
    Off,
    On,
}

impl MaintenanceFlag {
    /// Interpret a raw shared-storage value.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("true") => Self::On,
            _ => Self::Off,
        }
    }

    /// The string written to storage.
    #[must_use]
    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::On => "true",
            Self::Off => "false",
        }
    }

    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for MaintenanceFlag {
    fn from(enabled: bool) -> Self {
        if enabled { Self::On } else { Self::Off }
    }
}

impl std::fmt::Display for MaintenanceFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}
