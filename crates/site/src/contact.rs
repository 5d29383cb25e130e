//! Contact form validation and delivery.
//!
//! A submission is validated first; nothing is handed to a transport until
//! every required field is present and the address looks deliverable. Valid
//! submissions are then either turned into a `mailto:` link for the
//! visitor's own mail client, or sent through the resolved email transport.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sinertis_core::Email;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::{ContactConfig, EmailJsConfig};
use crate::email::{SendResponse, TemplateParams, TransportError, TransportSlot};

/// Shape check applied before any delivery.
static EMAIL_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

const PHONE_MISSING: &str = "Non fourni";
const SUBJECT_PREFIX: &str = "Demande: ";
const BODY_FOOTER: &str = "Envoyé via le formulaire Sinertis Studio";

/// Errors from a contact submission.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Veuillez remplir tous les champs obligatoires")]
    MissingFields,
    #[error("Email invalide")]
    InvalidEmail,
    #[error("Email delivery failed: {0}")]
    Transport(#[from] TransportError),
}

impl ContactError {
    /// Status line shown under the form.
    #[must_use]
    pub const fn status_message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Veuillez remplir tous les champs obligatoires",
            Self::InvalidEmail => "Email invalide",
            Self::Transport(_) => "Erreur lors de l'envoi. Veuillez réessayer plus tard.",
        }
    }
}

/// Raw form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub service: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Trim and check the submission.
    ///
    /// # Errors
    ///
    /// [`ContactError::MissingFields`] if name, email, service, subject or
    /// message is blank; [`ContactError::InvalidEmail`] if the address fails
    /// the shape check.
    pub fn validate(&self) -> Result<ValidContact, ContactError> {
        let required = [
            self.name.trim(),
            self.email.trim(),
            self.service.trim(),
            self.subject.trim(),
            self.message.trim(),
        ];
        if required.iter().any(|field| field.is_empty()) {
            return Err(ContactError::MissingFields);
        }

        let email = self.email.trim();
        if !EMAIL_SHAPE_RE.is_match(email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(ValidContact {
            name: self.name.trim().to_owned(),
            email: email.to_owned(),
            phone: self
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned),
            service: self.service.trim().to_owned(),
            subject: self.subject.trim().to_owned(),
            message: self.message.trim().to_owned(),
        })
    }
}

/// A submission that passed validation, fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    name: String,
    email: String,
    phone: Option<String>,
    service: String,
    subject: String,
    message: String,
}

impl ValidContact {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Plain-text message body.
    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "Nom: {name}\nEmail: {email}\nTéléphone: {phone}\nService: {service}\nSujet: {subject}\n\nMessage:\n{message}\n\n---\n{BODY_FOOTER}",
            name = self.name,
            email = self.email,
            phone = self.phone.as_deref().unwrap_or(PHONE_MISSING),
            service = self.service,
            subject = self.subject,
            message = self.message,
        )
    }

    /// `mailto:` link with encoded subject and body.
    #[must_use]
    pub fn mailto_link(&self, recipient: &Email) -> String {
        format!(
            "mailto:{recipient}?subject={subject}&body={body}",
            subject = urlencoding::encode(&format!("{SUBJECT_PREFIX}{}", self.subject)),
            body = urlencoding::encode(&self.body()),
        )
    }

    /// Template variables for a transport send.
    #[must_use]
    pub fn template_params(&self, recipient: &Email) -> TemplateParams {
        TemplateParams::new()
            .with("to_email", recipient.as_str())
            .with("from_name", self.name.as_str())
            .with("from_email", self.email.as_str())
            .with("phone", self.phone.as_deref().unwrap_or(PHONE_MISSING))
            .with("service", self.service.as_str())
            .with("subject", format!("{SUBJECT_PREFIX}{}", self.subject))
            .with("message", self.message.as_str())
    }
}

/// How valid submissions are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactStrategy {
    /// Hand a `mailto:` link back to the visitor.
    #[default]
    MailClient,
    /// Send through the email transport.
    Transport,
}

impl fmt::Display for ContactStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MailClient => "mailto",
            Self::Transport => "transport",
        })
    }
}

impl FromStr for ContactStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mailto" | "mail" => Ok(Self::MailClient),
            "transport" | "emailjs" => Ok(Self::Transport),
            other => Err(format!("unknown contact strategy '{other}'")),
        }
    }
}

/// Result of a delivered submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    MailClient { link: String },
    Sent(SendResponse),
}

impl ContactOutcome {
    #[must_use]
    pub const fn status_message(&self) -> &'static str {
        match self {
            Self::MailClient { .. } => "Message préparé! Cliquez pour envoyer par email...",
            Self::Sent(_) => "Message envoyé avec succès!",
        }
    }
}

/// Validates and delivers contact submissions.
pub struct ContactService {
    strategy: ContactStrategy,
    recipient: Email,
    slot: TransportSlot,
    service_id: String,
    template_id: String,
    public_key: Option<SecretString>,
}

impl fmt::Debug for ContactService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactService")
            .field("strategy", &self.strategy)
            .field("recipient", &self.recipient)
            .field("tier", &self.slot.tier())
            .finish_non_exhaustive()
    }
}

impl ContactService {
    /// Service that only builds `mailto:` links.
    #[must_use]
    pub fn mail_client(recipient: Email) -> Self {
        Self {
            strategy: ContactStrategy::MailClient,
            recipient,
            slot: TransportSlot::new(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: None,
        }
    }

    /// Service configured from the environment.
    #[must_use]
    pub fn from_config(contact: &ContactConfig, emailjs: &EmailJsConfig, slot: TransportSlot) -> Self {
        Self {
            strategy: contact.strategy,
            recipient: contact.recipient.clone(),
            slot,
            service_id: emailjs.service_id.clone(),
            template_id: emailjs.template_id.clone(),
            public_key: Some(emailjs.public_key.clone()),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> ContactStrategy {
        self.strategy
    }

    /// Validate and deliver one submission.
    ///
    /// # Errors
    ///
    /// Validation errors, or [`ContactError::Transport`] if the send fails.
    #[instrument(skip(self, form), fields(strategy = %self.strategy))]
    pub async fn submit(&self, form: &ContactForm) -> Result<ContactOutcome, ContactError> {
        let contact = form.validate().inspect_err(|e| {
            warn!(error = %e, "Contact form rejected");
        })?;

        match self.strategy {
            ContactStrategy::MailClient => {
                info!("Contact message prepared for mail client");
                Ok(ContactOutcome::MailClient {
                    link: contact.mailto_link(&self.recipient),
                })
            }
            ContactStrategy::Transport => {
                let params = contact.template_params(&self.recipient);
                let response = self
                    .slot
                    .send(
                        &self.service_id,
                        &self.template_id,
                        &params,
                        self.public_key.as_ref().map(|k| k.expose_secret()),
                    )
                    .await?;
                info!(message_id = %response.message_id, "Contact message sent");
                Ok(ContactOutcome::Sent(response))
            }
        }
    }
}
