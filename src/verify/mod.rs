//! Bot-risk verification.
//!
//! The oracle is abstracted behind [`BotRiskVerifier`]; this module only
//! decides whether what the oracle said is good enough.

pub mod recaptcha;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::VerificationError;

pub use recaptcha::RecaptchaVerifier;

/// What the oracle reported for one token. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Option<Vec<String>>,
}

/// A remote scoring oracle.
#[async_trait]
pub trait BotRiskVerifier: Send + Sync {
    /// Submit `token` for scoring. Transport failures are errors; a
    /// negative verdict is an `Ok` result with `success = false`.
    async fn verify(
        &self,
        secret: &SecretString,
        token: &str,
    ) -> Result<VerificationResult, VerificationError>;
}

/// Acceptance rules applied to an oracle result.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationPolicy {
    pub expected_action: String,
    pub score_threshold: f64,
}

/// Outcome of applying a [`VerificationPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected { reason: String },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl VerificationPolicy {
    /// Accept only on success, a matching action (if reported) and a score
    /// at or above the threshold (if reported).
    pub fn evaluate(&self, result: &VerificationResult) -> Verdict {
        if !result.success {
            let codes = result
                .error_codes
                .as_ref()
                .map(|c| c.join(","))
                .unwrap_or_default();
            return Verdict::Rejected {
                reason: format!("oracle reported failure (error codes: [{codes}])"),
            };
        }

        if let Some(action) = &result.action
            && action != &self.expected_action
        {
            return Verdict::Rejected {
                reason: format!(
                    "action mismatch: expected {}, got {action}",
                    self.expected_action
                ),
            };
        }

        if let Some(score) = result.score
            && score < self.score_threshold
        {
            return Verdict::Rejected {
                reason: format!("score {score} below threshold {}", self.score_threshold),
            };
        }

        Verdict::Accepted
    }
}
