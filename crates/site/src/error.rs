//! Unified error handling.
//!
//! Each module keeps its own error enum; [`AppError`] gathers them for
//! callers that drive several subsystems at once, such as the CLI.

use thiserror::Error;

use crate::admin::AdminError;
use crate::config::ConfigError;
use crate::contact::ContactError;
use crate::email::TransportError;
use crate::storage::StorageError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shared storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Email transport failed.
    #[error("Email error: {0}")]
    Transport(#[from] TransportError),

    /// Contact submission rejected or undeliverable.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// Admin operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Overlay rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    /// Message safe to show a visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Contact(e) => e.status_message().to_owned(),
            Self::Admin(AdminError::InvalidPassword) => "Mot de passe incorrect".to_owned(),
            Self::Admin(AdminError::NotAuthenticated) => "Connexion requise".to_owned(),
            Self::Transport(_) | Self::Admin(AdminError::Transport(_)) => {
                "Erreur lors de l'envoi. Veuillez réessayer plus tard.".to_owned()
            }
            Self::Config(_) | Self::Storage(_) | Self::Admin(_) | Self::Template(_) => {
                "Une erreur interne est survenue".to_owned()
            }
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_messages_pass_through() {
        let err = AppError::from(ContactError::InvalidEmail);
        assert_eq!(err.user_message(), "Email invalide");
    }

    #[test]
    fn test_transport_details_hidden() {
        let err = AppError::from(TransportError::ProviderHttp {
            status: 401,
            body: "The Public Key is invalid".to_owned(),
        });
        assert!(!err.user_message().contains("Public Key"));
        assert!(err.to_string().contains("401"));
    }
}
