//! Email transport errors.

use thiserror::Error;

/// Errors surfaced by the transport chain and its tiers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A required argument was empty; nothing was sent.
    #[error("Missing required parameter: {0}")]
    MissingParameters(&'static str),

    /// A send was attempted before tier resolution bound a transport.
    #[error("Email transport not loaded")]
    TransportNotReady,

    /// No public key was passed and `init` never ran.
    #[error("Public key not initialized, call init() first")]
    NotInitialized,

    /// The provider answered outside the 2xx range.
    #[error("EmailJS API error: {status}")]
    ProviderHttp { status: u16, body: String },

    /// A tier did not load within its timeout.
    #[error("Timed out loading email client")]
    ScriptLoadTimeout,

    /// A tier failed to load.
    #[error("Failed to load email client: {0}")]
    ScriptLoadError(String),

    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The tier does not support this operation.
    #[error("{0} not available in fallback")]
    Unsupported(&'static str),

    /// Every candidate tier failed.
    #[error("No email transport available")]
    NoTransportAvailable,

    /// The slot already holds a transport.
    #[error("Email transport already bound")]
    AlreadyBound,
}

impl TransportError {
    /// Provider status code, for HTTP failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Diagnostic category, for HTTP failures.
    #[must_use]
    pub const fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Self::ProviderHttp { status, .. } => Some(ProviderErrorKind::from_status(*status)),
            _ => None,
        }
    }
}

/// What a provider status code most likely means.
///
/// Used for logging only; no category triggers a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// 400: wrong service/template id or missing `to_email`.
    Misconfigured,
    /// 401: public key invalid or expired.
    InvalidKey,
    /// 403: account refused the request.
    AccessDenied,
    /// 429: too many requests.
    RateLimited,
    Other,
}

impl ProviderErrorKind {
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Misconfigured,
            401 => Self::InvalidKey,
            403 => Self::AccessDenied,
            429 => Self::RateLimited,
            _ => Self::Other,
        }
    }

    /// Operator hint for the logs.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Misconfigured => {
                "Service ID or Template ID might be incorrect, check that to_email is provided"
            }
            Self::InvalidKey => "Public key is invalid or expired",
            Self::AccessDenied => "Access denied, check the EmailJS account",
            Self::RateLimited => "Too many requests, rate limited",
            Self::Other => "Unexpected provider response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_categories() {
        assert_eq!(ProviderErrorKind::from_status(400), ProviderErrorKind::Misconfigured);
        assert_eq!(ProviderErrorKind::from_status(401), ProviderErrorKind::InvalidKey);
        assert_eq!(ProviderErrorKind::from_status(403), ProviderErrorKind::AccessDenied);
        assert_eq!(ProviderErrorKind::from_status(429), ProviderErrorKind::RateLimited);
        assert_eq!(ProviderErrorKind::from_status(500), ProviderErrorKind::Other);
    }

    #[test]
    fn test_status_accessor() {
        let err = TransportError::ProviderHttp {
            status: 429,
            body: "Too Many Requests".to_owned(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::RateLimited));
        assert_eq!(TransportError::TransportNotReady.status(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TransportError::MissingParameters("service_id").to_string(),
            "Missing required parameter: service_id"
        );
        assert_eq!(
            TransportError::Unsupported("sendForm").to_string(),
            "sendForm not available in fallback"
        );
    }
}
