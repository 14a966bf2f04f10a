//! Outbound email via SMTP (lettre), plus a logging fallback.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use super::{EmailSender, OutgoingEmail};
use crate::config::SmtpConfig;
use crate::error::EmailError;

/// Sends multipart (text + HTML) mail through an authenticated SMTP relay.
pub struct SmtpEmailSender {
    config: SmtpConfig,
}

impl SmtpEmailSender {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

/// Build the MIME message for `email`.
pub fn build_message(from: &str, email: &OutgoingEmail) -> Result<Message, EmailError> {
    let from: Mailbox = from.parse().map_err(|e| EmailError::InvalidAddress {
        address: from.to_string(),
        reason: format!("{e}"),
    })?;
    let to: Mailbox = email.to.parse().map_err(|e| EmailError::InvalidAddress {
        address: email.to.clone(),
        reason: format!("{e}"),
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| EmailError::Build(e.to_string()))
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = build_message(&self.config.from_address, &email)?;
        let config = self.config.clone();

        // lettre's SmtpTransport is blocking.
        tokio::task::spawn_blocking(move || {
            let creds = Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            );
            let transport = SmtpTransport::relay(&config.host)
                .map_err(|e| EmailError::Send(format!("SMTP relay error: {e}")))?
                .port(config.port)
                .credentials(creds)
                .build();
            transport
                .send(&message)
                .map_err(|e| EmailError::Send(e.to_string()))?;
            Ok::<(), EmailError>(())
        })
        .await
        .map_err(|e| EmailError::Send(format!("SMTP task panicked: {e}")))??;

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Used when SMTP is not configured: records what would have been sent.
#[derive(Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured; email not delivered"
        );
        Ok(())
    }
}
