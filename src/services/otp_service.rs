//! Domain service for single-use account codes.
//!
//! Activation and password-reset codes live in separate key spaces, so a
//! code minted for one purpose can never be redeemed by the other.

use std::fmt;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Activation,
    ResetPassword,
}

impl OtpPurpose {
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Activation => "act:",
            Self::ResetPassword => "rst:",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait OtpService: Send + Sync {
    /// Issues a code valid for the activation TTL and returns it.
    fn generate_activation_otp(&self, username: &str) -> Result<String, AppError>;

    /// Issues a code valid for the reset TTL and returns it.
    fn generate_reset_password_otp(&self, username: &str) -> Result<String, AppError>;

    /// Consumes an activation code, returning the username it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidOtp`] if the code is unknown, used or expired.
    fn validate_activation_otp(&self, code: &str) -> Result<String, AppError>;

    /// Consumes a reset code, returning the username it was issued for.
    fn validate_reset_password_otp(&self, code: &str) -> Result<String, AppError>;
}
