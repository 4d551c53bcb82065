use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use tracing::debug;

use crate::db::{StoreError, StoreResult, now_rfc3339};
use crate::domain::{UserId, mask, normalize_username};
use crate::entities::users;
use crate::models::user::{STATUS_ACTIVE, User, UserInfo, UserRecord, UserStatus};

const ENTITY: &str = "user";

/// Credential store for user accounts.
///
/// Usernames are lowercased on every call; soft-deleted rows are invisible.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_username(&self, username: &str) -> StoreResult<User>;

    async fn get_by_id(&self, id: UserId) -> StoreResult<User>;

    /// Fails with [`StoreError::AlreadyExists`] when the username is taken.
    async fn create(&self, record: UserRecord) -> StoreResult<User>;

    async fn update_status(&self, username: &str, status: &UserStatus) -> StoreResult<()>;

    /// Applies only to active, non-deleted accounts.
    async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<()>;

    async fn update_info(&self, id: UserId, info: &UserInfo) -> StoreResult<()>;
}

pub struct SeaOrmUserRepository {
    conn: DatabaseConnection,
}

impl SeaOrmUserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn expect_one(rows_affected: u64) -> StoreResult<()> {
    if rows_affected == 0 {
        Err(StoreError::NotFound { entity: ENTITY })
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn get_by_username(&self, username: &str) -> StoreResult<User> {
        debug!(username = %mask(username), "Fetching user by username");

        users::Entity::find()
            .filter(users::Column::Username.eq(normalize_username(username)))
            .filter(users::Column::Deleted.eq(false))
            .one(&self.conn)
            .await?
            .map(User::from)
            .ok_or(StoreError::NotFound { entity: ENTITY })
    }

    async fn get_by_id(&self, id: UserId) -> StoreResult<User> {
        debug!(user_id = %id, "Fetching user by id");

        users::Entity::find_by_id(id.value())
            .filter(users::Column::Deleted.eq(false))
            .one(&self.conn)
            .await?
            .map(User::from)
            .ok_or(StoreError::NotFound { entity: ENTITY })
    }

    async fn create(&self, record: UserRecord) -> StoreResult<User> {
        debug!(username = %mask(&record.username), "Creating user");

        let now = now_rfc3339();
        let active = users::ActiveModel {
            username: Set(normalize_username(&record.username)),
            password_hash: Set(record.password_hash),
            first_name: Set(record.profile.first_name),
            last_name: Set(record.profile.last_name),
            email: Set(record.profile.email),
            plan: Set(record.profile.plan),
            status: Set(record.status.as_str().to_string()),
            deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .map_err(|e| StoreError::from_write(e, ENTITY, ENTITY))?;

        Ok(User::from(model))
    }

    async fn update_status(&self, username: &str, status: &UserStatus) -> StoreResult<()> {
        debug!(username = %mask(username), status = status.as_str(), "Updating user status");

        let result = users::Entity::update_many()
            .col_expr(users::Column::Status, Expr::value(status.as_str()))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(users::Column::Username.eq(normalize_username(username)))
            .filter(users::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await?;

        expect_one(result.rows_affected)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<()> {
        debug!(username = %mask(username), "Replacing user password");

        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(users::Column::Username.eq(normalize_username(username)))
            .filter(users::Column::Deleted.eq(false))
            .filter(users::Column::Status.eq(STATUS_ACTIVE))
            .exec(&self.conn)
            .await?;

        expect_one(result.rows_affected)
    }

    async fn update_info(&self, id: UserId, info: &UserInfo) -> StoreResult<()> {
        debug!(user_id = %id, email = %mask(&info.email), "Updating user info");

        let result = users::Entity::update_many()
            .col_expr(users::Column::FirstName, Expr::value(info.first_name.as_str()))
            .col_expr(users::Column::LastName, Expr::value(info.last_name.as_str()))
            .col_expr(users::Column::Email, Expr::value(info.email.as_str()))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(users::Column::Id.eq(id.value()))
            .filter(users::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await?;

        expect_one(result.rows_affected)
    }
}
