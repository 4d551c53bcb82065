use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{AuthorId, BookId, Price, mask};

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// ============================================================================
// Auth
// ============================================================================

#[derive(Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SigninRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigninRequest")
            .field("username", &mask(&self.username))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninResponse {
    pub access_token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub expires_in: u64,
    /// Always empty; there is no refresh flow.
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &mask(&self.username))
            .field("firstname", &mask(&self.firstname))
            .field("lastname", &mask(&self.lastname))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub otp: String,
}

/// Body of both `activation/resend` and `password/reset`.
#[derive(Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

impl fmt::Debug for UsernameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernameRequest")
            .field("username", &mask(&self.username))
            .finish()
    }
}

#[derive(Deserialize)]
pub struct ReplacePasswordRequest {
    pub otp: String,
    pub new_password: String,
}

impl fmt::Debug for ReplacePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplacePasswordRequest")
            .finish_non_exhaustive()
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub info: UserInfoDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoDto {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AuthorRequest {
    pub name: String,
    pub dob: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorSummaryDto {
    pub id: AuthorId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: AuthorId,
    pub name: String,
    pub dob: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub author_id: i64,
    pub price: Price,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookSummaryDto {
    pub id: BookId,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookDto {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub author_id: AuthorId,
    pub price: Price,
}
