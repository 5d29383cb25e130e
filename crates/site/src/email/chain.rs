//! Tier resolution.
//!
//! Candidates are tried in order, each under its own timeout. The first one
//! that loads wins and is initialised with the public key. Failures are
//! logged and swallowed; only an exhausted list is an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};
use url::Url;

use super::{EmailJsClient, EmailTransport, MockTransport, TransportError};
use crate::config::EmailJsConfig;

/// Default per-candidate load timeout.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Which kind of implementation serviced resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// A handle supplied by the caller.
    Preexisting,
    /// The bundled HTTP client.
    LocalReal,
    /// The client loaded from the CDN.
    CdnReal,
    /// The non-sending fallback.
    Mock,
}

impl Tier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preexisting => "preexisting",
            Self::LocalReal => "local-real",
            Self::CdnReal => "cdn-real",
            Self::Mock => "mock",
        }
    }

    /// Whether sends on this tier reach the provider.
    #[must_use]
    pub const fn is_real(self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way of obtaining a transport.
#[derive(Debug, Clone)]
pub enum TransportCandidate {
    Preexisting(Arc<dyn EmailTransport>),
    /// Bundled client. Unavailable when disabled or when the API base cannot
    /// produce a send endpoint.
    LocalClient { enabled: bool, api_base: Url },
    /// Client published on the CDN. Available when `script_url` answers 2xx.
    CdnClient { script_url: Url, api_base: Url },
    Mock,
}

impl TransportCandidate {
    #[must_use]
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Preexisting(_) => Tier::Preexisting,
            Self::LocalClient { .. } => Tier::LocalReal,
            Self::CdnClient { .. } => Tier::CdnReal,
            Self::Mock => Tier::Mock,
        }
    }

    async fn load(&self, http: &Client) -> Result<Arc<dyn EmailTransport>, TransportError> {
        match self {
            Self::Preexisting(handle) => Ok(Arc::clone(handle)),
            Self::LocalClient { enabled, api_base } => {
                if !enabled {
                    return Err(TransportError::ScriptLoadError(
                        "local client disabled".to_owned(),
                    ));
                }
                let client = EmailJsClient::with_client(http.clone(), api_base)
                    .map_err(|e| TransportError::ScriptLoadError(e.to_string()))?;
                Ok(Arc::new(client))
            }
            Self::CdnClient {
                script_url,
                api_base,
            } => {
                let response = http
                    .get(script_url.clone())
                    .send()
                    .await
                    .map_err(|e| TransportError::ScriptLoadError(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(TransportError::ScriptLoadError(format!(
                        "{script_url} returned {}",
                        response.status()
                    )));
                }
                let client = EmailJsClient::with_client(http.clone(), api_base)
                    .map_err(|e| TransportError::ScriptLoadError(e.to_string()))?;
                Ok(Arc::new(client))
            }
            Self::Mock => Ok(Arc::new(MockTransport::new())),
        }
    }
}

/// The transport chosen by resolution.
#[derive(Debug, Clone)]
pub struct ResolvedTransport {
    pub tier: Tier,
    pub transport: Arc<dyn EmailTransport>,
}

/// Ordered candidate list with a shared per-candidate timeout.
pub struct TransportChain {
    candidates: Vec<TransportCandidate>,
    timeout: Duration,
    public_key: Option<SecretString>,
    http: Client,
}

impl fmt::Debug for TransportChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportChain")
            .field(
                "candidates",
                &self.candidates.iter().map(TransportCandidate::tier).collect::<Vec<_>>(),
            )
            .field("timeout", &self.timeout)
            .field("public_key", &self.public_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl TransportChain {
    #[must_use]
    pub fn new(candidates: Vec<TransportCandidate>) -> Self {
        Self {
            candidates,
            timeout: DEFAULT_LOAD_TIMEOUT,
            public_key: None,
            http: Client::new(),
        }
    }

    /// Standard order: bundled client, CDN client, fallback.
    #[must_use]
    pub fn from_config(config: &EmailJsConfig) -> Self {
        Self::new(vec![
            TransportCandidate::LocalClient {
                enabled: config.local_client,
                api_base: config.api_base.clone(),
            },
            TransportCandidate::CdnClient {
                script_url: config.cdn_url.clone(),
                api_base: config.api_base.clone(),
            },
            TransportCandidate::Mock,
        ])
        .with_timeout(config.cdn_timeout)
        .with_public_key(config.public_key.clone())
    }

    /// Put a caller-owned handle ahead of every other candidate.
    #[must_use]
    pub fn with_preexisting(mut self, handle: Arc<dyn EmailTransport>) -> Self {
        self.candidates
            .insert(0, TransportCandidate::Preexisting(handle));
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_public_key(mut self, public_key: SecretString) -> Self {
        self.public_key = Some(public_key);
        self
    }

    #[must_use]
    pub fn candidates(&self) -> &[TransportCandidate] {
        &self.candidates
    }

    /// Try each candidate in order and return the first that loads.
    ///
    /// A candidate still loading when its timeout elapses is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoTransportAvailable`] if every candidate
    /// fails. Cannot happen while [`TransportCandidate::Mock`] is listed.
    #[instrument(skip(self), fields(candidates = self.candidates.len()))]
    pub async fn resolve(&self) -> Result<ResolvedTransport, TransportError> {
        for candidate in &self.candidates {
            let tier = candidate.tier();
            let loaded = match tokio::time::timeout(self.timeout, candidate.load(&self.http)).await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::ScriptLoadTimeout),
            };

            match loaded {
                Ok(transport) => {
                    if let Some(key) = &self.public_key {
                        transport.init(key.expose_secret());
                    }
                    if tier.is_real() {
                        info!(tier = %tier, "Email transport resolved");
                    } else {
                        warn!(tier = %tier, "No real email transport available, using fallback");
                    }
                    return Ok(ResolvedTransport { tier, transport });
                }
                Err(e) => {
                    warn!(tier = %tier, error = %e, "Email transport candidate unavailable");
                }
            }
        }
        Err(TransportError::NoTransportAvailable)
    }
}
