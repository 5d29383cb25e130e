//! Email transport chain.
//!
//! Contact submissions are delivered through the EmailJS send API. Which
//! implementation services a send is decided once, up front, by
//! [`TransportChain::resolve`]: a handle the caller already owns, the bundled
//! HTTP client, the client fetched from the CDN, or finally a mock that only
//! pretends. Every tier honours the same [`EmailTransport`] contract, so
//! callers never branch on which one answered.
//!
//! # Modules
//!
//! - `emailjs` - the real HTTP client
//! - `mock` - the non-sending fallback
//! - `chain` - candidate tiers and first-success resolution
//! - `slot` - the single binding point callers send through

mod chain;
mod emailjs;
mod error;
mod mock;
mod slot;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

pub use chain::{DEFAULT_LOAD_TIMEOUT, ResolvedTransport, Tier, TransportCandidate, TransportChain};
pub use emailjs::{EmailJsClient, SEND_PATH};
pub use error::{ProviderErrorKind, TransportError};
pub use mock::{MOCK_DELAY, MOCK_TEXT, MockTransport};
pub use slot::TransportSlot;

/// Template variables for one send.
///
/// Keys are the EmailJS template variable names (`to_email`, `from_name`,
/// `message`, ...). Ordered so request bodies are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateParams(BTreeMap<String, String>);

impl TemplateParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Overlay `other` on top, its values winning on shared keys.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Recipient address, if present and non-blank.
    #[must_use]
    pub fn to_email(&self) -> Option<&str> {
        self.get("to_email").filter(|v| !v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Normalised result of a successful send, whichever tier serviced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResponse {
    pub status: u16,
    pub text: String,
    pub message_id: String,
}

/// The EmailJS-shaped sending capability.
#[async_trait]
pub trait EmailTransport: Send + Sync + std::fmt::Debug {
    /// Record the public key used when a send does not pass one.
    ///
    /// Idempotent: a second call is a logged no-op.
    fn init(&self, public_key: &str);

    fn is_initialized(&self) -> bool;

    /// Send one templated email.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError::MissingParameters`] before any network
    /// activity if `service_id`, `template_id` or `params` is empty; real tiers
    /// also surface provider and network failures. Nothing is retried.
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
        public_key: Option<&str>,
    ) -> Result<SendResponse, TransportError>;

    /// Send the fields of a submitted form as template variables.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send); tiers that cannot read forms return
    /// [`TransportError::Unsupported`].
    async fn send_form(
        &self,
        service_id: &str,
        template_id: &str,
        fields: &[(String, String)],
        public_key: Option<&str>,
    ) -> Result<SendResponse, TransportError> {
        let params: TemplateParams = fields.iter().cloned().collect();
        self.send(service_id, template_id, &params, public_key).await
    }
}

/// Argument check shared by every tier.
pub(crate) fn check_required(
    service_id: &str,
    template_id: &str,
    params: &TemplateParams,
) -> Result<(), TransportError> {
    if service_id.trim().is_empty() {
        return Err(TransportError::MissingParameters("service_id"));
    }
    if template_id.trim().is_empty() {
        return Err(TransportError::MissingParameters("template_id"));
    }
    if params.is_empty() {
        return Err(TransportError::MissingParameters("params"));
    }
    Ok(())
}

/// Shorten a public key for logging.
pub(crate) fn key_preview(key: &str) -> String {
    let shown: String = key.chars().take(10).collect();
    format!("{shown}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_required() {
        let params = TemplateParams::new().with("to_email", "a@b.com");
        assert!(check_required("s", "t", &params).is_ok());
        assert!(matches!(
            check_required("", "t", &params),
            Err(TransportError::MissingParameters("service_id"))
        ));
        assert!(matches!(
            check_required("s", " ", &params),
            Err(TransportError::MissingParameters("template_id"))
        ));
        assert!(matches!(
            check_required("s", "t", &TemplateParams::new()),
            Err(TransportError::MissingParameters("params"))
        ));
    }

    #[test]
    fn test_to_email_ignores_blank() {
        assert_eq!(TemplateParams::new().with("to_email", "  ").to_email(), None);
        assert_eq!(
            TemplateParams::new().with("to_email", "a@b.com").to_email(),
            Some("a@b.com")
        );
    }

    #[test]
    fn test_params_serialize_as_object() {
        let params = TemplateParams::new()
            .with("message", "Bonjour")
            .with("from_name", "Léa");
        let json = serde_json::to_value(&params).unwrap_or_default();
        assert_eq!(json["from_name"], "Léa");
        assert_eq!(json["message"], "Bonjour");
    }

    #[test]
    fn test_key_preview() {
        assert_eq!(key_preview("JlFndnem1HPuDIV3S"), "JlFndnem1H...");
        assert_eq!(key_preview("short"), "short...");
    }
}
