//! Cache-backed implementation of the `OtpService` trait.

use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::config::AuthConfig;
use crate::domain::mask;
use crate::error::AppError;
use crate::services::otp_service::{OtpPurpose, OtpService};

const MAX_ATTEMPTS: usize = 5;

pub struct CacheOtpService {
    cache: Arc<dyn TtlCache>,
    activation_ttl: Duration,
    reset_ttl: Duration,
}

impl CacheOtpService {
    #[must_use]
    pub fn new(cache: Arc<dyn TtlCache>, config: &AuthConfig) -> Self {
        Self::with_ttls(
            cache,
            Duration::from_secs(config.activation_otp_ttl_seconds),
            Duration::from_secs(config.reset_otp_ttl_seconds),
        )
    }

    #[must_use]
    pub const fn with_ttls(
        cache: Arc<dyn TtlCache>,
        activation_ttl: Duration,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            activation_ttl,
            reset_ttl,
        }
    }

    const fn ttl(&self, purpose: OtpPurpose) -> Duration {
        match purpose {
            OtpPurpose::Activation => self.activation_ttl,
            OtpPurpose::ResetPassword => self.reset_ttl,
        }
    }

    fn generate(&self, purpose: OtpPurpose, username: &str) -> Result<String, AppError> {
        for _ in 0..MAX_ATTEMPTS {
            let code = new_code();
            let key = format!("{}{code}", purpose.key_prefix());
            let stored = self
                .cache
                .put(key, username.to_string(), self.ttl(purpose))
                .map_err(AppError::internal)?;
            if stored {
                debug!(%purpose, username = %mask(username), "Issued one-time code");
                metrics::counter!("otp_issued_total", "purpose" => purpose.as_str()).increment(1);
                return Ok(code);
            }
            warn!(%purpose, "One-time code collided with a live entry, drawing again");
        }

        Err(AppError::internal(anyhow::anyhow!(
            "could not allocate a unique {purpose} code"
        )))
    }

    fn validate(&self, purpose: OtpPurpose, code: &str) -> Result<String, AppError> {
        let key = format!("{}{code}", purpose.key_prefix());
        let outcome = self.cache.take(&key);

        let label = if outcome.is_some() { "valid" } else { "invalid" };
        metrics::counter!("otp_redeemed_total", "purpose" => purpose.as_str(), "outcome" => label)
            .increment(1);

        outcome.ok_or_else(|| {
            debug!(%purpose, "Rejected one-time code");
            AppError::InvalidOtp
        })
    }
}

/// Six random decimal digits, hashed so the raw number never leaves the server.
fn new_code() -> String {
    let number: u32 = rand::rng().random_range(100_000..=999_999);
    hex::encode(Sha256::digest(format!("{number:06}").as_bytes()))
}

impl OtpService for CacheOtpService {
    fn generate_activation_otp(&self, username: &str) -> Result<String, AppError> {
        self.generate(OtpPurpose::Activation, username)
    }

    fn generate_reset_password_otp(&self, username: &str) -> Result<String, AppError> {
        self.generate(OtpPurpose::ResetPassword, username)
    }

    fn validate_activation_otp(&self, code: &str) -> Result<String, AppError> {
        self.validate(OtpPurpose::Activation, code)
    }

    fn validate_reset_password_otp(&self, code: &str) -> Result<String, AppError> {
        self.validate(OtpPurpose::ResetPassword, code)
    }
}
