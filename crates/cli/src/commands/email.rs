//! Email commands.

use sinertis_site::admin::{EmailDraft, Mailer};
use sinertis_site::config::{ContactConfig, EmailJsConfig};
use sinertis_site::error::AppError;

/// Resolve the transport chain and send one draft to the site's recipient.
///
/// Needs the provider settings and the recipient, not the admin password.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the send fails.
pub async fn send(draft: EmailDraft) -> Result<(), AppError> {
    let contact = ContactConfig::from_env()?;
    let emailjs = EmailJsConfig::from_env()?;
    let slot = super::resolve_slot(&emailjs).await?;
    let mailer = Mailer::new(&emailjs, contact.recipient, slot);

    let response = mailer.send(draft).await?;

    tracing::info!(
        status = response.status,
        text = %response.text,
        message_id = %response.message_id,
        "Email sent"
    );
    Ok(())
}
