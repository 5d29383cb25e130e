//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SINERTIS_ADMIN_PASSWORD` - Admin panel password (high entropy, no placeholders)
//! - `EMAILJS_SERVICE_ID` - EmailJS service identifier
//! - `EMAILJS_TEMPLATE_ID` - EmailJS template identifier
//! - `EMAILJS_PUBLIC_KEY` - EmailJS public key
//!
//! ## Optional
//! - `CONTACT_RECIPIENT` - Contact form recipient (default: contactsinertis@yahoo.com)
//! - `CONTACT_STRATEGY` - `mailto` or `transport` (default: mailto)
//! - `EMAILJS_API_BASE` - Provider base URL (default: <https://api.emailjs.com>)
//! - `EMAILJS_CDN_URL` - Client script URL probed by the CDN tier
//! - `EMAILJS_CDN_TIMEOUT_SECS` - Per-candidate load timeout (default: 5)
//! - `EMAILJS_LOCAL_CLIENT` - Enable the bundled client tier (default: true)
//! - `MAINTENANCE_DEBOUNCE_MS` - Storage change debounce (default: 100)
//! - `SINERTIS_STORAGE_PATH` - Shared storage file (default: sinertis-storage.json)

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use sinertis_core::Email;
use thiserror::Error;
use url::Url;

use crate::contact::ContactStrategy;

pub const DEFAULT_RECIPIENT: &str = "contactsinertis@yahoo.com";
pub const DEFAULT_API_BASE: &str = "https://api.emailjs.com";
pub const DEFAULT_CDN_URL: &str =
    "https://cdn.jsdelivr.net/npm/@emailjs/browser@4/dist/index.min.js";
pub const DEFAULT_STORAGE_PATH: &str = "sinertis-storage.json";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 2.5;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "admin123",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Full site configuration.
#[derive(Clone)]
pub struct SiteConfig {
    /// Admin panel password
    pub admin_password: SecretString,
    /// Email provider configuration
    pub emailjs: EmailJsConfig,
    /// Contact form delivery
    pub contact: ContactConfig,
    /// Storage and gate timing
    pub maintenance: MaintenanceConfig,
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfig")
            .field("admin_password", &"[REDACTED]")
            .field("emailjs", &self.emailjs)
            .field("contact", &self.contact)
            .field("maintenance", &self.maintenance)
            .finish()
    }
}

/// EmailJS provider configuration.
///
/// Implements `Debug` manually to redact the public key.
#[derive(Clone)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: SecretString,
    /// Provider API base URL
    pub api_base: Url,
    /// Script URL probed by the CDN tier
    pub cdn_url: Url,
    /// Per-candidate load timeout
    pub cdn_timeout: Duration,
    /// Whether the bundled client tier is enabled
    pub local_client: bool,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"[REDACTED]")
            .field("api_base", &self.api_base.as_str())
            .field("cdn_url", &self.cdn_url.as_str())
            .field("cdn_timeout", &self.cdn_timeout)
            .field("local_client", &self.local_client)
            .finish()
    }
}

/// Contact form delivery configuration.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub recipient: Email,
    pub strategy: ContactStrategy,
}

/// Shared storage location and gate timing.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub storage_path: PathBuf,
    pub debounce: Duration,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            debounce: crate::maintenance::DEFAULT_DEBOUNCE,
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin password fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let admin_password = get_validated_secret("SINERTIS_ADMIN_PASSWORD")?;

        Ok(Self {
            admin_password,
            emailjs: EmailJsConfig::from_env()?,
            contact: ContactConfig::from_env()?,
            maintenance: MaintenanceConfig::from_env()?,
        })
    }
}

impl EmailJsConfig {
    /// Load the provider configuration alone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on missing ids/key or unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            service_id: get_required_env("EMAILJS_SERVICE_ID")?,
            template_id: get_required_env("EMAILJS_TEMPLATE_ID")?,
            public_key: SecretString::from(get_required_env("EMAILJS_PUBLIC_KEY")?),
            api_base: parse_env(
                "EMAILJS_API_BASE",
                &get_env_or_default("EMAILJS_API_BASE", DEFAULT_API_BASE),
            )?,
            cdn_url: parse_env(
                "EMAILJS_CDN_URL",
                &get_env_or_default("EMAILJS_CDN_URL", DEFAULT_CDN_URL),
            )?,
            cdn_timeout: Duration::from_secs(parse_env(
                "EMAILJS_CDN_TIMEOUT_SECS",
                &get_env_or_default("EMAILJS_CDN_TIMEOUT_SECS", "5"),
            )?),
            local_client: parse_bool(
                "EMAILJS_LOCAL_CLIENT",
                &get_env_or_default("EMAILJS_LOCAL_CLIENT", "true"),
            )?,
        })
    }
}

impl ContactConfig {
    /// Load the contact settings alone; needs no secrets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the recipient or strategy does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            recipient: parse_env(
                "CONTACT_RECIPIENT",
                &get_env_or_default("CONTACT_RECIPIENT", DEFAULT_RECIPIENT),
            )?,
            strategy: parse_env(
                "CONTACT_STRATEGY",
                &get_env_or_default("CONTACT_STRATEGY", "mailto"),
            )?,
        })
    }
}

impl MaintenanceConfig {
    /// Load storage settings alone; needs no secrets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the debounce is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let storage_path =
            PathBuf::from(get_env_or_default("SINERTIS_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let debounce = get_optional_env("MAINTENANCE_DEBOUNCE_MS")
            .map(|ms| parse_env("MAINTENANCE_DEBOUNCE_MS", &ms).map(Duration::from_millis))
            .transpose()?
            .unwrap_or(crate::maintenance::DEFAULT_DEBOUNCE);

        Ok(Self {
            storage_path,
            debounce,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a value, naming the variable on failure.
fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn emailjs() -> EmailJsConfig {
        EmailJsConfig {
            service_id: "service_abc".to_string(),
            template_id: "template_xyz".to_string(),
            public_key: SecretString::from("pk_super_secret_value"),
            api_base: Url::parse(DEFAULT_API_BASE).unwrap(),
            cdn_url: Url::parse(DEFAULT_CDN_URL).unwrap(),
            cdn_timeout: Duration::from_secs(5),
            local_client: true,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme123", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("MyPassword!", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        assert!(validate_secret_strength("aaaaaaaaaaaa", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("Sn7!qK2#vT9pLm", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(matches!(
            parse_bool("X", "maybe"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_env_names_variable() {
        let err = parse_env::<u64>("EMAILJS_CDN_TIMEOUT_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("EMAILJS_CDN_TIMEOUT_SECS"));
        let recipient: Email = parse_env("CONTACT_RECIPIENT", DEFAULT_RECIPIENT).unwrap();
        assert_eq!(recipient.as_str(), DEFAULT_RECIPIENT);
        let strategy: ContactStrategy = parse_env("CONTACT_STRATEGY", "transport").unwrap();
        assert_eq!(strategy, ContactStrategy::Transport);
    }

    #[test]
    fn test_defaults_parse() {
        let base: Url = parse_env("EMAILJS_API_BASE", DEFAULT_API_BASE).unwrap();
        assert_eq!(base.host_str(), Some("api.emailjs.com"));
        let cdn: Url = parse_env("EMAILJS_CDN_URL", DEFAULT_CDN_URL).unwrap();
        assert_eq!(cdn.host_str(), Some("cdn.jsdelivr.net"));
    }

    #[test]
    fn test_maintenance_default() {
        let config = MaintenanceConfig::default();
        assert_eq!(config.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
        assert_eq!(config.debounce, Duration::from_millis(100));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = SiteConfig {
            admin_password: SecretString::from("Adm1n!Sinertis#2024"),
            emailjs: emailjs(),
            contact: ContactConfig {
                recipient: Email::parse(DEFAULT_RECIPIENT).unwrap(),
                strategy: ContactStrategy::MailClient,
            },
            maintenance: MaintenanceConfig::default(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("service_abc"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("Adm1n!Sinertis#2024"));
        assert!(!debug_output.contains("pk_super_secret_value"));
    }
}
