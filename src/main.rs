use std::sync::Arc;

use anyhow::Context;

use homecare_contact::config::{ContactConfig, ServerConfig, SmtpConfig};
use homecare_contact::contact::{ContactService, app_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server = ServerConfig::from_env();
    let contact = ContactConfig::from_env().context("Invalid contact configuration")?;

    if contact.recaptcha_secret.is_none() {
        tracing::error!("RECAPTCHA_SECRET_KEY not set; every contact submission will fail");
    }
    if contact.notification_email.is_none() {
        tracing::warn!("CONTACT_NOTIFICATION_EMAIL not set; operator notifications disabled");
    }

    let service = Arc::new(
        ContactService::open(contact, &server.db_path, SmtpConfig::from_env())
            .await
            .with_context(|| {
                format!("Failed to start contact service (database at {})", server.db_path.display())
            })?,
    );
    let app = app_router(service, server.public_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server.port))
        .await
        .with_context(|| format!("Failed to bind port {}", server.port))?;
    tracing::info!(port = server.port, "Contact server started");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
