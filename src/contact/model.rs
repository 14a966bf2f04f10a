//! Contact submission types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A validated, normalized contact-form entry.
///
/// Only constructed by [`super::validation::validate`]; every instance
/// satisfies the field rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Canonical `(XXX) XXX-XXXX`.
    pub phone: String,
    pub message: String,
}

/// A submission after it has been written to the content store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub submission: ContactSubmission,
    pub created_at: DateTime<Utc>,
}

/// Successful response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactAccepted {
    pub message: String,
}

impl ContactAccepted {
    pub fn thank_you() -> Self {
        Self {
            message: "Thank you! We'll be in touch soon.".to_string(),
        }
    }
}

/// Where a request stopped in the pipeline. Used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Parsed,
    Validated,
    Verified,
    Persisted,
    Notified,
    Completed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Received => "received",
            Stage::Parsed => "parsed",
            Stage::Validated => "validated",
            Stage::Verified => "verified",
            Stage::Persisted => "persisted",
            Stage::Notified => "notified",
            Stage::Completed => "completed",
        };
        f.write_str(s)
    }
}
