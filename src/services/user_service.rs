use async_trait::async_trait;

use crate::domain::UserId;
use crate::error::AppError;
use crate::models::{CurrentUser, User, UserInfo};

/// Account reads and mutations that sit behind the auth flows.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user_by_id(&self, id: UserId) -> Result<User, AppError>;

    async fn get_user_by_username(&self, username: &str) -> Result<User, AppError>;

    /// Marks the account active. Store failures surface as `Internal`.
    async fn activate(&self, username: &str) -> Result<(), AppError>;

    /// Only succeeds for active accounts; anything else is `NotFound`.
    async fn update_password(&self, username: &str, new_password: &str) -> Result<(), AppError>;

    async fn update_info(&self, current: &CurrentUser, info: UserInfo) -> Result<(), AppError>;
}
