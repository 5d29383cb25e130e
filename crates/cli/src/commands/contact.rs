//! Contact form command.

use sinertis_site::config::{ConfigError, ContactConfig, EmailJsConfig};
use sinertis_site::contact::{ContactForm, ContactOutcome, ContactService, ContactStrategy};
use sinertis_site::error::AppError;

/// Validate and deliver a contact submission using the configured strategy.
///
/// Provider settings are only loaded for the `transport` strategy.
///
/// # Errors
///
/// Returns the validation or delivery error; its status message is logged.
pub async fn submit(form: ContactForm) -> Result<(), AppError> {
    let config = ContactConfig::from_env()?;
    let service = build_service(&config, EmailJsConfig::from_env).await?;

    let outcome = service.submit(&form).await.map_err(|e| {
        tracing::warn!("{}", e.status_message());
        AppError::from(e)
    })?;

    tracing::info!("{}", outcome.status_message());
    #[allow(clippy::print_stdout)]
    {
        match outcome {
            ContactOutcome::MailClient { link } => println!("{link}"),
            ContactOutcome::Sent(response) => println!("{}", response.message_id),
        }
    }
    Ok(())
}

async fn build_service(
    config: &ContactConfig,
    load_emailjs: impl FnOnce() -> Result<EmailJsConfig, ConfigError>,
) -> Result<ContactService, AppError> {
    match config.strategy {
        ContactStrategy::MailClient => Ok(ContactService::mail_client(config.recipient.clone())),
        ContactStrategy::Transport => {
            let emailjs = load_emailjs()?;
            let slot = super::resolve_slot(&emailjs).await?;
            Ok(ContactService::from_config(config, &emailjs, slot))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(strategy: ContactStrategy) -> ContactConfig {
        ContactConfig {
            recipient: "contactsinertis@yahoo.com".parse().unwrap(),
            strategy,
        }
    }

    fn form() -> ContactForm {
        ContactForm {
            name: "Lea".to_owned(),
            email: "lea@example.com".to_owned(),
            phone: None,
            service: "Video".to_owned(),
            subject: "Projet".to_owned(),
            message: "Bonjour".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_mail_client_needs_no_provider_config() {
        let service = build_service(&config(ContactStrategy::MailClient), || {
            Err(ConfigError::MissingEnvVar("EMAILJS_SERVICE_ID".to_owned()))
        })
        .await
        .unwrap();

        let outcome = service.submit(&form()).await.unwrap();
        assert!(matches!(
            outcome,
            ContactOutcome::MailClient { ref link } if link.starts_with("mailto:contactsinertis@yahoo.com")
        ));
    }

    #[tokio::test]
    async fn test_transport_requires_provider_config() {
        let err = build_service(&config(ContactStrategy::Transport), || {
            Err(ConfigError::MissingEnvVar("EMAILJS_SERVICE_ID".to_owned()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Config(ConfigError::MissingEnvVar(_))));
    }
}
