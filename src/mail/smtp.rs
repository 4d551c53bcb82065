use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::MailTransport;
use crate::config::MailConfig;
use crate::domain::mask;

/// Relays HTML mail through an SMTP server. A connection is opened per message.
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("mail.from is not a valid address: {}", config.from))?;

        let mut builder = if config.smtp_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .with_context(|| format!("Invalid SMTP relay: {}", config.smtp_host))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
        };
        builder = builder.port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            starttls = config.smtp_starttls,
            "SMTP mail transport configured"
        );

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn compose(&self, recipients: &[String], subject: &str, body: &str) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML);

        for recipient in recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .with_context(|| format!("Invalid recipient: {}", mask(recipient)))?;
            builder = builder.to(mailbox);
        }

        builder
            .body(body.to_string())
            .context("Failed to build mail message")
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        let message = self.compose(recipients, subject, body)?;
        self.mailer
            .send(message)
            .await
            .context("SMTP delivery failed")?;
        Ok(())
    }
}
