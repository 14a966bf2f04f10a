//! The contact submission pipeline.
//!
//! `Received → Parsed → Validated → Verified → Persisted → Notified → Completed`.
//! Any failing stage ends the request; later stages never run.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::model::{ContactAccepted, Stage};
use super::validation;
use crate::config::{ContactConfig, SmtpConfig};
use crate::error::{ContactError, MISSING_TOKEN_MESSAGE, VERIFICATION_FAILED_MESSAGE};
use crate::notify::{EmailSender, LogEmailSender, NotificationDispatcher, SmtpEmailSender};
use crate::store::{LibSqlBackend, SubmissionStore};
use crate::verify::{BotRiskVerifier, RecaptchaVerifier, Verdict, VerificationPolicy};

/// Injected collaborators for [`ContactService`].
pub struct ContactDeps {
    pub verifier: Arc<dyn BotRiskVerifier>,
    pub store: Arc<dyn SubmissionStore>,
    pub email: Arc<dyn EmailSender>,
}

/// Orchestrates one contact submission end to end.
pub struct ContactService {
    config: ContactConfig,
    policy: VerificationPolicy,
    verifier: Arc<dyn BotRiskVerifier>,
    store: Arc<dyn SubmissionStore>,
    notifier: NotificationDispatcher,
}

impl ContactService {
    pub fn new(config: ContactConfig, deps: ContactDeps) -> Self {
        let policy = VerificationPolicy {
            expected_action: config.expected_action.clone(),
            score_threshold: config.score_threshold,
        };
        let notifier = NotificationDispatcher::new(
            deps.email,
            config.notification_email.clone(),
            config.site_name.clone(),
        );
        Self {
            config,
            policy,
            verifier: deps.verifier,
            store: deps.store,
            notifier,
        }
    }

    /// Build the production service: libSQL at `db_path`, the reCAPTCHA
    /// verifier, and SMTP delivery when configured (logged otherwise).
    pub async fn open(
        config: ContactConfig,
        db_path: &Path,
        smtp: Option<SmtpConfig>,
    ) -> crate::error::Result<Self> {
        let store = Arc::new(LibSqlBackend::new_local(db_path).await?);
        let verifier = Arc::new(RecaptchaVerifier::new(
            config.verify_url.clone(),
            config.verify_timeout,
        )?);

        let email: Arc<dyn EmailSender> = match smtp {
            Some(smtp) => {
                info!(host = %smtp.host, port = smtp.port, "SMTP email enabled");
                Arc::new(SmtpEmailSender::new(smtp))
            }
            None => {
                warn!("SMTP_HOST not set; notification emails will only be logged");
                Arc::new(LogEmailSender)
            }
        };

        Ok(Self::new(
            config,
            ContactDeps {
                verifier,
                store,
                email,
            },
        ))
    }

    /// Handle a raw request body.
    pub async fn submit(&self, body: &[u8]) -> Result<ContactAccepted, ContactError> {
        let mut stage = Stage::Received;
        let result = self.run(body, &mut stage).await;
        if let Err(e) = &result {
            log_failure(stage, e);
        }
        result
    }

    async fn run(&self, body: &[u8], stage: &mut Stage) -> Result<ContactAccepted, ContactError> {
        // Fail closed before looking at the input.
        let secret = self.config.require_secret()?;

        let raw: Value =
            serde_json::from_slice(body).map_err(|e| ContactError::BadRequest(e.to_string()))?;
        *stage = Stage::Parsed;

        let submission = validation::validate(&raw).map_err(ContactError::ValidationFailed)?;
        *stage = Stage::Validated;

        let token = raw
            .get("recaptchaToken")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ContactError::VerificationFailed {
                reason: "missing recaptchaToken".into(),
                public_message: MISSING_TOKEN_MESSAGE,
            })?;

        let result = self.verifier.verify(secret, token).await.map_err(|e| {
            ContactError::VerificationFailed {
                reason: format!("oracle unavailable: {e}"),
                public_message: VERIFICATION_FAILED_MESSAGE,
            }
        })?;
        if let Verdict::Rejected { reason } = self.policy.evaluate(&result) {
            return Err(ContactError::VerificationFailed {
                reason,
                public_message: VERIFICATION_FAILED_MESSAGE,
            });
        }
        *stage = Stage::Verified;

        let record = self.store.create_contact_request(&submission).await?;
        *stage = Stage::Persisted;

        // Delivery problems are logged by the dispatcher; the record stands.
        self.notifier.notify(&record).await;
        *stage = Stage::Notified;

        info!(
            record_id = %record.id,
            has_email = record.submission.email.is_some(),
            "Contact request stored"
        );
        *stage = Stage::Completed;
        Ok(ContactAccepted::thank_you())
    }
}

fn log_failure(stage: Stage, err: &ContactError) {
    match err {
        ContactError::BadRequest(reason) => {
            warn!(%stage, reason = %reason, "Rejected malformed contact payload");
        }
        ContactError::ValidationFailed(errors) => {
            let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
            info!(%stage, fields = ?fields, "Contact submission failed validation");
        }
        ContactError::VerificationFailed { reason, .. } => {
            warn!(%stage, reason = %reason, "Contact submission failed bot-risk verification");
        }
        ContactError::ConfigurationError(e) => {
            error!(%stage, error = %e, "Contact pipeline misconfigured");
        }
        ContactError::PersistenceFailed(e) => {
            error!(%stage, error = %e, "Failed to store contact request");
        }
    }
}
