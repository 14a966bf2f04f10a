//! reCAPTCHA siteverify client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{BotRiskVerifier, VerificationResult};
use crate::error::VerificationError;

/// Posts `secret` + `response` form fields to a siteverify endpoint.
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RecaptchaVerifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, VerificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerificationError::Transport(format!("Failed to build client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl BotRiskVerifier for RecaptchaVerifier {
    async fn verify(
        &self,
        secret: &SecretString,
        token: &str,
    ) -> Result<VerificationResult, VerificationError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", secret.expose_secret()), ("response", token)])
            .send()
            .await
            .map_err(|e| VerificationError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VerificationError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| VerificationError::Transport(e.to_string()))?;

        let result: VerificationResult = serde_json::from_str(&body)
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        debug!(
            success = result.success,
            score = ?result.score,
            action = ?result.action,
            "Oracle responded"
        );
        Ok(result)
    }
}
