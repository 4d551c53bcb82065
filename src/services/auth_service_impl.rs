//! `SeaORM`-backed implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

use crate::db::{StoreError, UserRepository};
use crate::domain::mask;
use crate::error::AppError;
use crate::models::{AccessGrant, NewUser, User, UserProfile, UserRecord, UserStatus};
use crate::security::password::{hash_blocking, verify_blocking};
use crate::security::{PasswordHasher, TokenIssuer};
use crate::services::auth_service::AuthService;

pub struct SeaOrmAuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    /// Hash verified against when the username is unknown, so both signin
    /// failures cost one password verification.
    decoy_hash: OnceCell<String>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            decoy_hash: OnceCell::new(),
        }
    }

    async fn verify(&self, password: &str, hash: String) -> Result<bool, AppError> {
        verify_blocking(Arc::clone(&self.hasher), password.to_string(), hash)
            .await
            .map_err(AppError::internal)
    }

    async fn burn_verification(&self, password: &str) -> Result<(), AppError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| {
                let secret = hex::encode(rand::random::<[u8; 16]>());
                hash_blocking(Arc::clone(&self.hasher), secret)
            })
            .await
            .map_err(AppError::internal)?;
        self.verify(password, decoy.clone()).await?;
        Ok(())
    }

    fn reject(reason: &'static str) -> AppError {
        metrics::counter!("auth_signin_total", "outcome" => reason).increment(1);
        AppError::Unauthorized
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signin(&self, username: &str, password: &str) -> Result<AccessGrant, AppError> {
        debug!(username = %mask(username), "Signin");

        let user = match self.users.get_by_username(username).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                warn!(username = %mask(username), "Signin for unknown user");
                self.burn_verification(password).await?;
                return Err(Self::reject("unknown_user"));
            }
            Err(e) => return Err(e.into()),
        };

        let valid = self.verify(password, user.password_hash.clone()).await?;

        if !valid {
            warn!(user_id = %user.id, "Signin with wrong password");
            return Err(Self::reject("bad_password"));
        }

        if let Err(gate) = user.status.ensure_allowed() {
            metrics::counter!("auth_signin_total", "outcome" => "gated").increment(1);
            return Err(gate);
        }

        let issued = self.tokens.issue(user.id)?;
        metrics::counter!("auth_signin_total", "outcome" => "success").increment(1);

        Ok(AccessGrant {
            access_token: issued.token,
            expires_in: issued.expires_in.as_secs(),
        })
    }

    async fn signup(&self, new_user: NewUser) -> Result<User, AppError> {
        debug!(username = %mask(&new_user.username), "Signup");

        let password_hash = hash_blocking(Arc::clone(&self.hasher), new_user.password)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::internal(e)
            })?;

        let record = UserRecord {
            username: new_user.username.clone(),
            password_hash,
            profile: UserProfile {
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                email: new_user.username.to_lowercase(),
                plan: String::new(),
            },
            status: UserStatus::NotActivated,
        };

        let user = self.users.create(record).await.map_err(|e| match e {
            StoreError::AlreadyExists { .. } => AppError::user_already_exists(&new_user.username),
            other => {
                error!(error = %other, "Failed to create user");
                AppError::from(other)
            }
        })?;

        metrics::counter!("auth_signup_total").increment(1);
        Ok(user)
    }
}
