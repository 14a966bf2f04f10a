//! Configuration types, built once from environment variables and injected
//! into the request handler.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default oracle endpoint (reCAPTCHA v3 siteverify).
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Action label the contact form's client script tags its token with.
pub const DEFAULT_EXPECTED_ACTION: &str = "contact_form";

pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

pub const DEFAULT_SITE_NAME: &str = "Attentive Home Care";

/// Contact pipeline configuration.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Oracle secret. `None` makes every submission fail closed.
    pub recaptcha_secret: Option<SecretString>,
    /// Minimum acceptable score when the oracle reports one.
    pub score_threshold: f64,
    /// Action label a token must carry when the oracle reports one.
    pub expected_action: String,
    pub verify_url: String,
    pub verify_timeout: Duration,
    /// Operator inbox for new-request notifications.
    pub notification_email: Option<String>,
    /// Display name used in email templates.
    pub site_name: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recaptcha_secret: None,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            expected_action: DEFAULT_EXPECTED_ACTION.to_string(),
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            verify_timeout: Duration::from_secs(10),
            notification_email: None,
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

impl ContactConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let score_threshold = match non_empty(&lookup, "RECAPTCHA_SCORE_THRESHOLD") {
            Some(raw) => parse_threshold(&raw)?,
            None => defaults.score_threshold,
        };

        let verify_timeout = match non_empty(&lookup, "RECAPTCHA_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "RECAPTCHA_TIMEOUT_SECS".into(),
                message: format!("{e}"),
            })?),
            None => defaults.verify_timeout,
        };

        Ok(Self {
            recaptcha_secret: non_empty(&lookup, "RECAPTCHA_SECRET_KEY").map(SecretString::from),
            score_threshold,
            expected_action: non_empty(&lookup, "RECAPTCHA_EXPECTED_ACTION")
                .unwrap_or(defaults.expected_action),
            verify_url: non_empty(&lookup, "RECAPTCHA_VERIFY_URL").unwrap_or(defaults.verify_url),
            verify_timeout,
            notification_email: non_empty(&lookup, "CONTACT_NOTIFICATION_EMAIL"),
            site_name: non_empty(&lookup, "SITE_NAME").unwrap_or(defaults.site_name),
        })
    }

    /// The oracle secret, or the configuration error that halts the pipeline.
    pub fn require_secret(&self) -> Result<&SecretString, ConfigError> {
        self.recaptcha_secret
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "RECAPTCHA_SECRET_KEY".into(),
                hint: "Set the reCAPTCHA secret key to accept contact submissions.".into(),
            })
    }
}

/// Outbound SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl SmtpConfig {
    /// Returns `None` if `SMTP_HOST` is not set (emails are logged instead).
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(&lookup, "SMTP_HOST")?;

        let port: u16 = non_empty(&lookup, "SMTP_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = lookup("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(lookup("SMTP_PASSWORD").unwrap_or_default());
        let from_address =
            non_empty(&lookup, "EMAIL_FROM_ADDRESS").unwrap_or_else(|| username.clone());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    /// Public site origin allowed to call the API cross-origin.
    pub public_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: non_empty(&lookup, "HOMECARE_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            db_path: non_empty(&lookup, "HOMECARE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/homecare.db")),
            public_origin: non_empty(&lookup, "PUBLIC_SERVER_URL"),
        }
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw.parse().map_err(|e| ConfigError::InvalidValue {
        key: "RECAPTCHA_SCORE_THRESHOLD".into(),
        message: format!("{e}"),
    })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: "RECAPTCHA_SCORE_THRESHOLD".into(),
            message: format!("{value} is outside [0, 1]"),
        });
    }
    Ok(value)
}
