//! Outgoing account mail: transport abstraction, embedded templates and the
//! notifier that composes them for activation and password reset.

pub mod notifier;
pub mod smtp;
pub mod templates;

pub use notifier::MailNotifier;
pub use smtp::SmtpMailTransport;
pub use templates::MailTemplates;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{MAIL_TRANSPORT_LOG, MAIL_TRANSPORT_SMTP, MailConfig};
use crate::domain::mask;

/// Delivery abstraction. Implementations decide how the message leaves the
/// process (SMTP relay, HTTP API, log sink).
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()>;
}

/// Development transport that writes messages to the log instead of sending.
#[derive(Clone, Debug, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        let masked: Vec<String> = recipients.iter().map(|r| mask(r)).collect();
        info!(recipients = ?masked, subject, bytes = body.len(), "Mail dispatched to log transport");
        debug!(body, "Mail body");
        Ok(())
    }
}

/// Builds the transport named by `mail.transport`.
pub fn transport_from_config(config: &MailConfig) -> Result<Arc<dyn MailTransport>> {
    match config.transport.as_str() {
        MAIL_TRANSPORT_LOG => Ok(Arc::new(LogMailTransport)),
        MAIL_TRANSPORT_SMTP => Ok(Arc::new(SmtpMailTransport::new(config)?)),
        other => anyhow::bail!("Unsupported mail transport: {other}"),
    }
}
