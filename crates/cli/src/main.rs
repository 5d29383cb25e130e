//! Sinertis CLI - maintenance mode and email tools for the site operator.
//!
//! # Usage
//!
//! ```bash
//! # Show the current maintenance state
//! sinertis maintenance status
//!
//! # Put the site in maintenance with a custom message
//! sinertis maintenance on --message "Retour à 18h"
//!
//! # Bring the site back
//! sinertis maintenance off
//!
//! # Update the social links shown on the overlay
//! sinertis settings set --youtube https://youtube.com/@sinertis
//!
//! # Send a test email through the transport chain
//! sinertis email send --message "Test"
//! ```
//!
//! # Commands
//!
//! - `maintenance` - Inspect, toggle or preview maintenance mode
//! - `settings` - Show or update the public site settings
//! - `email send` - Send a message to the site's recipient
//! - `contact` - Submit the contact form from the command line

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use sinertis_site::admin::EmailDraft;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sinertis")]
#[command(author, version, about = "Sinertis Studio site tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or toggle maintenance mode
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceAction,
    },
    /// Show or update site settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Send email through the transport chain
    Email {
        #[command(subcommand)]
        action: EmailAction,
    },
    /// Submit the contact form
    Contact(ContactArgs),
}

#[derive(Subcommand)]
enum MaintenanceAction {
    /// Show the maintenance flag, message and settings
    Status,
    /// Enable maintenance mode
    On {
        /// Custom message shown on the overlay
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Disable maintenance mode
    Off,
    /// Render the overlay as visitors would see it
    Preview,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show the current settings
    Show,
    /// Update one or more settings
    Set {
        /// YouTube channel URL
        #[arg(long)]
        youtube: Option<String>,

        /// Discord invite URL
        #[arg(long)]
        discord: Option<String>,
    },
}

#[derive(Subcommand)]
enum EmailAction {
    /// Send a message to the configured recipient
    Send {
        #[arg(long)]
        from_name: Option<String>,

        #[arg(long)]
        from_email: Option<String>,

        #[arg(short, long)]
        subject: Option<String>,

        #[arg(short, long)]
        message: String,

        /// Extra template variable as KEY=VALUE (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

#[derive(Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    service: String,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    message: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Maintenance { action } => match action {
            MaintenanceAction::Status => commands::maintenance::status()?,
            MaintenanceAction::On { message } => {
                commands::maintenance::enable(message.as_deref())?;
            }
            MaintenanceAction::Off => commands::maintenance::disable()?,
            MaintenanceAction::Preview => commands::maintenance::preview()?,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show()?,
            SettingsAction::Set { youtube, discord } => {
                commands::settings::set(youtube, discord)?;
            }
        },
        Commands::Email { action } => match action {
            EmailAction::Send {
                from_name,
                from_email,
                subject,
                message,
                params,
            } => {
                commands::email::send(EmailDraft {
                    from_name,
                    from_email,
                    subject,
                    message,
                    extra: params.into_iter().collect(),
                })
                .await?;
            }
        },
        Commands::Contact(args) => {
            commands::contact::submit(args.into_form()).await?;
        }
    }
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

impl ContactArgs {
    fn into_form(self) -> sinertis_site::contact::ContactForm {
        sinertis_site::contact::ContactForm {
            name: self.name,
            email: self.email,
            phone: self.phone,
            service: self.service,
            subject: self.subject,
            message: self.message,
        }
    }
}
