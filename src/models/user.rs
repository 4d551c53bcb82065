use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{UserId, mask};
use crate::entities::users;
use crate::error::AppError;

pub const STATUS_ACTIVE: &str = "";
pub const STATUS_NOT_ACTIVATED: &str = "not-activated";

/// Account lifecycle flag. Stored as a plain string so unknown values
/// written by other tooling survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    #[default]
    Active,
    NotActivated,
    Other(String),
}

impl UserStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::NotActivated => STATUS_NOT_ACTIVATED,
            Self::Other(s) => s,
        }
    }

    /// Status gate for signin and authenticated routes.
    pub fn ensure_allowed(&self) -> Result<(), AppError> {
        match self {
            Self::Active => Ok(()),
            Self::NotActivated => Err(AppError::UserNotActivated),
            Self::Other(_) => Err(AppError::Forbidden),
        }
    }
}

impl From<String> for UserStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            STATUS_ACTIVE => Self::Active,
            STATUS_NOT_ACTIVATED => Self::NotActivated,
            _ => Self::Other(value),
        }
    }
}

impl From<UserStatus> for String {
    fn from(status: UserStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub plan: String,
}

impl fmt::Debug for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProfile")
            .field("first_name", &mask(&self.first_name))
            .field("last_name", &mask(&self.last_name))
            .field("email", &mask(&self.email))
            .field("plan", &self.plan)
            .finish()
    }
}

#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub profile: UserProfile,
    pub status: UserStatus,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &mask(&self.username))
            .field("password_hash", &"<redacted>")
            .field("profile", &self.profile)
            .field("status", &self.status)
            .finish()
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            username: model.username,
            password_hash: model.password_hash,
            profile: UserProfile {
                first_name: model.first_name,
                last_name: model.last_name,
                email: model.email,
                plan: model.plan,
            },
            status: UserStatus::from(model.status),
        }
    }
}

/// Signup input. The password is plaintext until the auth service hashes it.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &mask(&self.username))
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Record handed to the credential store on signup.
#[derive(Clone)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub profile: UserProfile,
    pub status: UserStatus,
}

/// Editable profile fields for `PUT /user/info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Authenticated caller, resolved by the auth middleware and stored in the
/// request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub profile: UserProfile,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            profile: user.profile,
        }
    }
}

/// Result of a successful signin.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: String,
    pub expires_in: u64,
}
