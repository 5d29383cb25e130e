//! Admin panel operations.
//!
//! Authentication is per tab: a successful [`AdminPanel::login`] marks the
//! tab's session store, which exempts that tab from the maintenance overlay.
//! Maintenance and settings writes go to shared storage, where every other
//! tab's gate picks them up.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sinertis_core::{Email, MaintenanceFlag, SiteSettings, StorageKey};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::EmailJsConfig;
use crate::email::{SendResponse, TemplateParams, TransportError, TransportSlot};
use crate::storage::{SessionStore, StorageError, TabStorage};

pub const DEFAULT_FROM_NAME: &str = "Contact Form";
pub const DEFAULT_FROM_EMAIL: &str = "noreply@example.com";
pub const DEFAULT_SUBJECT: &str = "Nouveau message";

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Mot de passe incorrect")]
    InvalidPassword,
    #[error("Admin authentication required")]
    NotAuthenticated,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Email error: {0}")]
    Transport(#[from] TransportError),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot of the maintenance keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceStatus {
    pub flag: MaintenanceFlag,
    pub message: Option<String>,
    /// Raw stored toggle time.
    pub toggled_at: Option<String>,
    pub settings: SiteSettings,
}

impl MaintenanceStatus {
    /// Toggle time, if stored as RFC 3339.
    #[must_use]
    pub fn toggled_at_parsed(&self) -> Option<DateTime<Utc>> {
        self.toggled_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Direct writes to the maintenance keys.
///
/// No authentication: callers are either an authenticated [`AdminPanel`] or
/// an operator with direct storage access.
#[derive(Debug, Clone)]
pub struct MaintenanceControl {
    storage: TabStorage,
}

impl MaintenanceControl {
    #[must_use]
    pub const fn new(storage: TabStorage) -> Self {
        Self { storage }
    }

    /// Switch maintenance mode.
    ///
    /// The toggle time is written last so watchers reading on its change see
    /// the flag and message already settled. A `None` or blank message clears
    /// any stored custom message.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot persist a write.
    #[instrument(skip(self, message), fields(tab = self.storage.tab_id()))]
    pub fn set_maintenance(
        &self,
        enabled: bool,
        message: Option<&str>,
    ) -> Result<(), StorageError> {
        let flag = MaintenanceFlag::from(enabled);
        self.storage
            .set(StorageKey::MaintenanceMode, flag.as_stored())?;

        match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(message) => self.storage.set(StorageKey::MaintenanceMessage, message)?,
            None => self.storage.remove(StorageKey::MaintenanceMessage)?,
        }

        self.storage
            .set(StorageKey::MaintenanceToggleTime, &Utc::now().to_rfc3339())?;

        info!(flag = %flag, "Maintenance mode updated");
        Ok(())
    }

    /// Replace the public settings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails.
    pub fn update_settings(&self, settings: &SiteSettings) -> Result<(), AdminError> {
        self.storage
            .set(StorageKey::SiteSettings, &settings.to_stored()?)?;
        info!(
            youtube_url = %settings.youtube_url,
            discord_url = %settings.discord_url,
            "Site settings updated"
        );
        Ok(())
    }

    #[must_use]
    pub fn status(&self) -> MaintenanceStatus {
        MaintenanceStatus {
            flag: MaintenanceFlag::from_stored(
                self.storage.get(StorageKey::MaintenanceMode).as_deref(),
            ),
            message: self
                .storage
                .get(StorageKey::MaintenanceMessage)
                .filter(|m| !m.trim().is_empty()),
            toggled_at: self.storage.get(StorageKey::MaintenanceToggleTime),
            settings: SiteSettings::from_stored(
                self.storage.get(StorageKey::SiteSettings).as_deref(),
            ),
        }
    }
}

/// A message composed from the admin panel.
#[derive(Debug, Clone, Default)]
pub struct EmailDraft {
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    /// Extra template variables, applied last so they override the above.
    pub extra: TemplateParams,
}

impl EmailDraft {
    fn into_params(self, recipient: &Email) -> TemplateParams {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        }

        TemplateParams::new()
            .with("to_email", recipient.as_str())
            .with("from_name", or_default(self.from_name, DEFAULT_FROM_NAME))
            .with("from_email", or_default(self.from_email, DEFAULT_FROM_EMAIL))
            .with("subject", or_default(self.subject, DEFAULT_SUBJECT))
            .with("message", self.message)
            .merge(self.extra)
    }
}

/// Sends drafts to the site's recipient through the resolved transport.
#[derive(Clone)]
pub struct Mailer {
    slot: TransportSlot,
    service_id: String,
    template_id: String,
    public_key: SecretString,
    recipient: Email,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("tier", &self.slot.tier())
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"[REDACTED]")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Mailer {
    #[must_use]
    pub fn new(config: &EmailJsConfig, recipient: Email, slot: TransportSlot) -> Self {
        Self {
            slot,
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            public_key: config.public_key.clone(),
            recipient,
        }
    }

    /// Send a draft.
    ///
    /// # Errors
    ///
    /// Returns the transport's error unchanged.
    #[instrument(skip(self, draft))]
    pub async fn send(&self, draft: EmailDraft) -> Result<SendResponse, TransportError> {
        let params = draft.into_params(&self.recipient);
        self.slot
            .send(
                &self.service_id,
                &self.template_id,
                &params,
                Some(self.public_key.expose_secret()),
            )
            .await
    }
}

/// The admin panel for one tab.
pub struct AdminPanel {
    control: MaintenanceControl,
    session: SessionStore,
    password: SecretString,
    mailer: Option<Mailer>,
}

impl std::fmt::Debug for AdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPanel")
            .field("control", &self.control)
            .field("authenticated", &self.session.is_authenticated())
            .field("password", &"[REDACTED]")
            .field("mailer", &self.mailer)
            .finish()
    }
}

impl AdminPanel {
    #[must_use]
    pub fn new(storage: TabStorage, session: SessionStore, password: SecretString) -> Self {
        Self {
            control: MaintenanceControl::new(storage),
            session,
            password,
            mailer: None,
        }
    }

    #[must_use]
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Check the password and mark the session authenticated.
    ///
    /// # Errors
    ///
    /// [`AdminError::InvalidPassword`] on mismatch; the session is untouched.
    pub fn login(&self, password: &str) -> Result<(), AdminError> {
        let matches: bool = password
            .as_bytes()
            .ct_eq(self.password.expose_secret().as_bytes())
            .into();
        if !matches {
            warn!("Admin login rejected");
            return Err(AdminError::InvalidPassword);
        }
        self.session.mark_authenticated()?;
        info!("Admin logged in");
        Ok(())
    }

    /// End the admin session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub fn logout(&self) -> Result<(), AdminError> {
        self.session.clear()?;
        info!("Admin logged out");
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn require_auth(&self) -> Result<(), AdminError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AdminError::NotAuthenticated)
        }
    }

    /// # Errors
    ///
    /// [`AdminError::NotAuthenticated`] before login, or a storage failure.
    pub fn set_maintenance(&self, enabled: bool, message: Option<&str>) -> Result<(), AdminError> {
        self.require_auth()?;
        self.control.set_maintenance(enabled, message)?;
        Ok(())
    }

    /// # Errors
    ///
    /// [`AdminError::NotAuthenticated`] before login, or a storage failure.
    pub fn update_settings(&self, settings: &SiteSettings) -> Result<(), AdminError> {
        self.require_auth()?;
        self.control.update_settings(settings)
    }

    #[must_use]
    pub fn maintenance_status(&self) -> MaintenanceStatus {
        self.control.status()
    }

    /// Send a draft to the site's recipient.
    ///
    /// # Errors
    ///
    /// [`TransportError::TransportNotReady`] when no mailer is attached,
    /// otherwise the transport's error.
    pub async fn send_email(&self, draft: EmailDraft) -> Result<SendResponse, AdminError> {
        let mailer = self
            .mailer
            .as_ref()
            .ok_or(TransportError::TransportNotReady)?;
        Ok(mailer.send(draft).await?)
    }
}
