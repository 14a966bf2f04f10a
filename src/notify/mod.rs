//! Notification emails for stored contact requests.
//!
//! Up to two emails go out per request: one to the operator inbox (when
//! configured) and a confirmation to the submitter (when they gave an
//! address). Delivery failures are logged and reported, never raised.

pub mod smtp;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::contact::model::ContactRecord;
use crate::error::EmailError;

pub use smtp::{LogEmailSender, SmtpEmailSender};

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// An email-sending service.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Which emails went out for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationReport {
    pub operator_sent: bool,
    pub confirmation_sent: bool,
    pub failures: usize,
}

/// Composes and sends the operator and submitter emails.
pub struct NotificationDispatcher {
    sender: Arc<dyn EmailSender>,
    operator_address: Option<String>,
    site_name: String,
}

impl NotificationDispatcher {
    pub fn new(
        sender: Arc<dyn EmailSender>,
        operator_address: Option<String>,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            operator_address,
            site_name: site_name.into(),
        }
    }

    /// Email for the operator inbox.
    pub fn operator_email(&self, to: &str, record: &ContactRecord) -> OutgoingEmail {
        let submission = &record.submission;
        let rendered = template::render(
            "New contact request",
            &format!(
                "A new contact request was submitted through the {} website.",
                self.site_name
            ),
            submission,
        );
        OutgoingEmail {
            to: to.to_string(),
            subject: format!("New contact request from {}", submission.name),
            html: rendered.html,
            text: rendered.text,
        }
    }

    /// Confirmation for the submitter.
    pub fn confirmation_email(&self, to: &str, record: &ContactRecord) -> OutgoingEmail {
        let submission = &record.submission;
        let rendered = template::render(
            &format!("Thank you, {}!", submission.name),
            &format!(
                "We received your message and someone from {} will be in touch soon. \
                 Here is a copy of what you sent us:",
                self.site_name
            ),
            submission,
        );
        OutgoingEmail {
            to: to.to_string(),
            subject: format!("We received your message - {}", self.site_name),
            html: rendered.html,
            text: rendered.text,
        }
    }

    /// Send whichever emails apply to `record`. Each is attempted on its own.
    pub async fn notify(&self, record: &ContactRecord) -> NotificationReport {
        let mut report = NotificationReport::default();

        if let Some(operator) = &self.operator_address {
            let email = self.operator_email(operator, record);
            match self.sender.send(email).await {
                Ok(()) => report.operator_sent = true,
                Err(e) => {
                    report.failures += 1;
                    error!(record_id = %record.id, error = %e, "Failed to send operator notification");
                }
            }
        }

        if let Some(address) = &record.submission.email {
            let email = self.confirmation_email(address, record);
            match self.sender.send(email).await {
                Ok(()) => report.confirmation_sent = true,
                Err(e) => {
                    report.failures += 1;
                    error!(record_id = %record.id, error = %e, "Failed to send confirmation email");
                }
            }
        }

        info!(
            record_id = %record.id,
            operator = report.operator_sent,
            confirmation = report.confirmation_sent,
            failures = report.failures,
            "Notifications dispatched"
        );
        report
    }
}
