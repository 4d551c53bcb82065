use std::sync::Arc;
use tracing::{debug, error};

use super::{MailTemplates, MailTransport};
use crate::domain::mask;
use crate::error::{AppError, AppResult};

pub const SUBJECT_ACTIVATION: &str = "Activate Your Account";
pub const SUBJECT_RESET_PASSWORD: &str = "Reset Password";

/// Renders account lifecycle mails and hands them to the transport.
pub struct MailNotifier {
    transport: Arc<dyn MailTransport>,
    templates: MailTemplates,
    activation_url: String,
    reset_password_url: String,
}

impl MailNotifier {
    /// `domain` is the public base URL, e.g. `https://books.example.com`.
    #[must_use]
    pub fn new(transport: Arc<dyn MailTransport>, templates: MailTemplates, domain: &str) -> Self {
        let base = domain.trim_end_matches('/');
        Self {
            transport,
            templates,
            activation_url: format!("{base}/auth/activate"),
            reset_password_url: format!("{base}/auth/reset"),
        }
    }

    pub async fn send_activation_mail(&self, to: &str, otp: &str) -> AppResult<()> {
        debug!(to = %mask(to), "Sending activation mail");
        let body = self.templates.activation(&self.activation_url, otp);
        self.dispatch(to, SUBJECT_ACTIVATION, &body).await
    }

    pub async fn send_reset_password_mail(&self, to: &str, otp: &str) -> AppResult<()> {
        debug!(to = %mask(to), "Sending reset password mail");
        let body = self.templates.reset_password(&self.reset_password_url, otp);
        self.dispatch(to, SUBJECT_RESET_PASSWORD, &body).await
    }

    async fn dispatch(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.transport
            .send(&[to.to_string()], subject, body)
            .await
            .map_err(|e| {
                error!(to = %mask(to), subject, error = %e, "Failed to send mail");
                AppError::SendMail(e)
            })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::mail::MailTransport;

    #[derive(Debug, Clone)]
    pub struct SentMail {
        pub recipients: Vec<String>,
        pub subject: String,
        pub body: String,
    }

    /// Transport that keeps every message for assertions.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<SentMail>>,
        pub fail: bool,
    }

    impl RecordingTransport {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn messages(&self) -> Vec<SentMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("transport unavailable");
            }
            self.sent.lock().unwrap().push(SentMail {
                recipients: recipients.to_vec(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }
}
