//! EmailJS REST client.
//!
//! The real tier: one POST per send to the provider's send endpoint. Used by
//! both the bundled and the CDN-loaded candidates.

use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use url::Url;

use super::{
    EmailTransport, ProviderErrorKind, SendResponse, TemplateParams, TransportError,
    check_required, key_preview,
};

/// Send endpoint, relative to the API base.
pub const SEND_PATH: &str = "api/v1.0/email/send";

/// Template variables always present in the body, overridable by the caller.
const DEFAULT_FIELDS: [(&str, &str); 7] = [
    ("to_email", ""),
    ("from_name", "Contact Form"),
    ("from_email", ""),
    ("subject", "Message"),
    ("message", ""),
    ("phone", ""),
    ("service", ""),
];

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

#[derive(Deserialize)]
struct SendReply {
    message_id: Option<String>,
}

/// HTTP client for the EmailJS send API.
pub struct EmailJsClient {
    client: Client,
    endpoint: Url,
    public_key: OnceLock<SecretString>,
}

impl std::fmt::Debug for EmailJsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("public_key", &"[REDACTED]")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl EmailJsClient {
    /// Create a client against `api_base` (e.g. `https://api.emailjs.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the send endpoint cannot be derived from the base.
    pub fn new(api_base: &Url) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), api_base)
    }

    /// Create a client sharing an existing connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the send endpoint cannot be derived from the base.
    pub fn with_client(client: Client, api_base: &Url) -> Result<Self, url::ParseError> {
        let endpoint = directory(api_base).join(SEND_PATH)?;
        Ok(Self {
            client,
            endpoint,
            public_key: OnceLock::new(),
        })
    }

    /// Full send URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn resolve_key<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .filter(|k| !k.is_empty())
            .or_else(|| self.public_key.get().map(|key| key.expose_secret()))
    }
}

/// `api_base` with a trailing slash, so joining keeps its last segment.
fn directory(api_base: &Url) -> Url {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn body_params(params: &TemplateParams) -> TemplateParams {
    let mut merged: TemplateParams = DEFAULT_FIELDS.into_iter().collect();
    for (key, value) in params.iter() {
        merged.insert(key, value);
    }
    merged
}

#[async_trait]
impl EmailTransport for EmailJsClient {
    fn init(&self, public_key: &str) {
        if public_key.is_empty() {
            error!("EmailJS init called without a public key");
            return;
        }
        if self.public_key.get().is_some() {
            info!("EmailJS already initialized");
            return;
        }
        if self
            .public_key
            .set(SecretString::from(public_key.to_owned()))
            .is_ok()
        {
            info!(key = %key_preview(public_key), "EmailJS initialized");
        }
    }

    fn is_initialized(&self) -> bool {
        self.public_key.get().is_some()
    }

    #[instrument(skip(self, params, public_key), fields(service_id = %service_id, template_id = %template_id))]
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
        public_key: Option<&str>,
    ) -> Result<SendResponse, TransportError> {
        check_required(service_id, template_id, params)?;
        if params.to_email().is_none() {
            error!("to_email is missing from template params");
            return Err(TransportError::MissingParameters("to_email"));
        }
        let user_id = self
            .resolve_key(public_key)
            .ok_or(TransportError::NotInitialized)?;

        let template_params = body_params(params);
        let request = SendRequest {
            service_id,
            template_id,
            user_id,
            template_params: &template_params,
        };

        debug!(endpoint = %self.endpoint, "Sending email via EmailJS");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let kind = ProviderErrorKind::from_status(status.as_u16());
            error!(
                status = status.as_u16(),
                kind = ?kind,
                body = %body,
                "{}",
                kind.hint()
            );
            return Err(TransportError::ProviderHttp {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.unwrap_or_default();
        let message_id = serde_json::from_str::<SendReply>(&text)
            .ok()
            .and_then(|reply| reply.message_id)
            .unwrap_or_else(|| "sent".to_owned());

        info!(message_id = %message_id, "Email sent");

        Ok(SendResponse {
            status: 200,
            text: "OK".to_owned(),
            message_id,
        })
    }
}
