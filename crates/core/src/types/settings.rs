//! Public site settings edited from the admin panel.

use serde::{Deserialize, Serialize};

/// Social links shown on the maintenance overlay.
///
/// Stored as JSON under [`StorageKey::SiteSettings`](crate::StorageKey::SiteSettings).
/// Fields missing from the stored record take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSettings {
    pub youtube_url: String,
    pub discord_url: String,
}

impl SiteSettings {
    pub const DEFAULT_YOUTUBE_URL: &'static str = "https://youtube.com/@sinertis";
    pub const DEFAULT_DISCORD_URL: &'static str = "https://discord.gg/pxkpH2bsJD";

    /// Interpret a raw shared-storage value.
    ///
    /// Absent, malformed, or non-object JSON yields the defaults.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Serialize to the stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            youtube_url: Self::DEFAULT_YOUTUBE_URL.to_owned(),
            discord_url: Self::DEFAULT_DISCORD_URL.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_uses_defaults() {
        let settings = SiteSettings::from_stored(None);
        assert_eq!(settings.youtube_url, "https://youtube.com/@sinertis");
        assert_eq!(settings.discord_url, "https://discord.gg/pxkpH2bsJD");
    }

    #[test]
    fn test_malformed_uses_defaults() {
        assert_eq!(SiteSettings::from_stored(Some("{not json")), SiteSettings::default());
        assert_eq!(SiteSettings::from_stored(Some("null")), SiteSettings::default());
        assert_eq!(SiteSettings::from_stored(Some("[1, 2]")), SiteSettings::default());
    }

    #[test]
    fn test_partial_record_fills_missing_field() {
        let settings =
            SiteSettings::from_stored(Some(r#"{"youtubeUrl":"https://youtube.com/@other"}"#));
        assert_eq!(settings.youtube_url, "https://youtube.com/@other");
        assert_eq!(settings.discord_url, SiteSettings::DEFAULT_DISCORD_URL);
    }

    #[test]
    fn test_stored_form_uses_camel_case() {
        let json = SiteSettings::default().to_stored().unwrap();
        assert!(json.contains("\"youtubeUrl\""));
        assert!(json.contains("\"discordUrl\""));
        assert_eq!(SiteSettings::from_stored(Some(&json)), SiteSettings::default());
    }
}
