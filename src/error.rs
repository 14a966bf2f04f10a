//! Error types for the contact service.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Shown to the caller for configuration and storage failures.
pub const RETRY_LATER_MESSAGE: &str =
    "We couldn't submit your request right now. Please try again later.";

/// Shown to the caller when the oracle rejects or cannot be reached.
pub const VERIFICATION_FAILED_MESSAGE: &str =
    "We couldn't verify your submission. Please try again.";

/// Shown when the request carries no proof token at all.
pub const MISSING_TOKEN_MESSAGE: &str =
    "Verification failed. Please refresh the page and try again.";

/// Shown when the body is not parseable JSON.
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid request payload.";

/// Shown alongside field errors.
pub const VALIDATION_FAILED_MESSAGE: &str = "Please correct the highlighted fields and try again.";

/// Top-level error for service startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Failures talking to the bot-risk oracle.
///
/// These are transport problems, not rejections: a reachable oracle that
/// says "no" produces a `VerificationResult` with `success = false`.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Oracle request failed: {0}")]
    Transport(String),

    #[error("Oracle returned HTTP {status}")]
    Status { status: u16 },

    #[error("Oracle response was not valid JSON: {0}")]
    InvalidResponse(String),
}

/// Email delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Send(String),
}

/// Field name → human-readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Outcome of a failed contact submission, mapped onto an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The body could not be parsed as JSON.
    #[error("Malformed request body: {0}")]
    BadRequest(String),

    /// One or more fields failed validation.
    #[error("Validation failed for {} field(s)", .0.len())]
    ValidationFailed(FieldErrors),

    /// The oracle rejected the interaction or could not be reached.
    #[error("Verification failed: {reason}")]
    VerificationFailed {
        reason: String,
        /// What the caller sees. Never carries oracle internals.
        public_message: &'static str,
    },

    /// Server-side secret is missing.
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),

    /// The content store rejected the write.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] DatabaseError),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::BadRequest(_)
            | ContactError::ValidationFailed(_)
            | ContactError::VerificationFailed { .. } => StatusCode::BAD_REQUEST,
            ContactError::ConfigurationError(_) | ContactError::PersistenceFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ContactError::BadRequest(_) => {
                serde_json::json!({ "message": INVALID_PAYLOAD_MESSAGE })
            }
            ContactError::ValidationFailed(errors) => serde_json::json!({
                "message": VALIDATION_FAILED_MESSAGE,
                "errors": errors,
            }),
            ContactError::VerificationFailed { public_message, .. } => {
                serde_json::json!({ "message": public_message })
            }
            ContactError::ConfigurationError(_) | ContactError::PersistenceFailed(_) => {
                serde_json::json!({ "message": RETRY_LATER_MESSAGE })
            }
        };
        (status, Json(body)).into_response()
    }
}
