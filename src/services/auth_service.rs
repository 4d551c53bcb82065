//! Domain service for credential checks and account creation.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{AccessGrant, NewUser, User};

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and mints an access token.
    ///
    /// # Errors
    ///
    /// Unknown username and wrong password both yield [`AppError::Unauthorized`].
    /// A correct password on a gated account yields [`AppError::UserNotActivated`]
    /// or [`AppError::Forbidden`].
    async fn signin(&self, username: &str, password: &str) -> Result<AccessGrant, AppError>;

    /// Hashes the password and stores a new `not-activated` account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] when the username is taken.
    async fn signup(&self, new_user: NewUser) -> Result<User, AppError>;
}
