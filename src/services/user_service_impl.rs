use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::UserRepository;
use crate::domain::{UserId, mask};
use crate::error::AppError;
use crate::models::{CurrentUser, User, UserInfo, UserStatus};
use crate::security::PasswordHasher;
use crate::security::password::hash_blocking;
use crate::services::user_service::UserService;

pub struct SeaOrmUserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn get_user_by_id(&self, id: UserId) -> Result<User, AppError> {
        Ok(self.users.get_by_id(id).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, AppError> {
        Ok(self.users.get_by_username(username).await?)
    }

    async fn activate(&self, username: &str) -> Result<(), AppError> {
        self.users
            .update_status(username, &UserStatus::Active)
            .await
            .map_err(|e| {
                error!(username = %mask(username), error = %e, "Failed to activate user");
                AppError::internal(e)
            })?;

        info!(username = %mask(username), "User activated");
        Ok(())
    }

    async fn update_password(&self, username: &str, new_password: &str) -> Result<(), AppError> {
        let hash = hash_blocking(Arc::clone(&self.hasher), new_password.to_string())
            .await
            .map_err(AppError::internal)?;

        self.users.update_password(username, &hash).await?;

        info!(username = %mask(username), "Password replaced");
        Ok(())
    }

    async fn update_info(&self, current: &CurrentUser, info: UserInfo) -> Result<(), AppError> {
        self.users.update_info(current.id, &info).await?;
        Ok(())
    }
}
