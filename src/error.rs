//! Domain error taxonomy shared by services, facades and the HTTP layer.
//!
//! Every variant resolves to exactly one HTTP status and one machine code;
//! the mapping lives here so that the transport layer only renders it.

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    AlreadyExists,
    InvalidOtp,
    UserNotActivated,
    UnsupportedMediaType,
    Timeout,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Decode(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("no bearer token found")]
    MissingBearerToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("User is not authorized to access this resource")]
    Forbidden,

    #[error("user not activated")]
    UserNotActivated,

    #[error("invalid otp")]
    InvalidOtp,

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{detail}")]
    AlreadyExists { title: String, detail: String },

    #[error("unsupported media type, expected application/json")]
    UnsupportedMediaType,

    #[error("request did not complete within {0:?}")]
    RequestTimeout(std::time::Duration),

    #[error("failed to send mail")]
    SendMail(#[source] anyhow::Error),

    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    #[must_use]
    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn user_already_exists(username: &str) -> Self {
        Self::AlreadyExists {
            title: "User already exists".to_string(),
            detail: format!("User [{username}] already exists"),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::Decode(_) => ErrorKind::BadRequest,
            Self::Unauthorized | Self::MissingBearerToken | Self::InvalidToken => {
                ErrorKind::Unauthorized
            }
            Self::Forbidden => ErrorKind::Forbidden,
            Self::UserNotActivated => ErrorKind::UserNotActivated,
            Self::InvalidOtp => ErrorKind::InvalidOtp,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::UnsupportedMediaType => ErrorKind::UnsupportedMediaType,
            Self::RequestTimeout(_) => ErrorKind::Timeout,
            Self::SendMail(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "ERR-001",
            Self::Unauthorized => "ERR-002",
            Self::Forbidden => "ERR-003",
            Self::NotFound { .. } => "ERR-004",
            Self::Internal(_) => "ERR-005",
            Self::UnsupportedMediaType => "ERR-006",
            Self::Validation(_) => "ERR-007",
            Self::Decode(_) => "ERR-008",
            Self::MissingBearerToken => "ERR-011",
            Self::InvalidToken => "ERR-012",
            Self::SendMail(_) => "ERR-013",
            Self::UserNotActivated => "ERR-015",
            Self::InvalidOtp => "ERR-016",
            Self::AlreadyExists { .. } => "ERR-017",
            Self::RequestTimeout(_) => "ERR-018",
        }
    }

    /// Title used when the caller does not supply an operation-specific one.
    #[must_use]
    pub fn default_title(&self) -> &str {
        match self {
            Self::BadRequest(_) => "Bad request",
            Self::Validation(_) => "problem validation request",
            Self::Decode(_) => "Problem decoding request",
            Self::Unauthorized | Self::MissingBearerToken | Self::InvalidToken => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::UserNotActivated => "User not activated",
            Self::InvalidOtp => "Invalid OTP",
            Self::NotFound { .. } => "Not found",
            Self::AlreadyExists { title, .. } => title,
            Self::UnsupportedMediaType => "Unsupported media type",
            Self::RequestTimeout(_) => "Request timeout",
            Self::SendMail(_) | Self::Internal(_) => "Internal server error",
        }
    }

    /// Internal-class errors never expose their detail to the client.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Internal)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity } => Self::NotFound { entity },
            StoreError::AlreadyExists { entity } => Self::AlreadyExists {
                title: "Already exists".to_string(),
                detail: format!("{entity} already exists"),
            },
            StoreError::MissingReference { entity } => {
                Self::BadRequest(format!("referenced {entity} does not exist"))
            }
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AppError::InvalidOtp.kind(), ErrorKind::InvalidOtp);
        assert_eq!(AppError::MissingBearerToken.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            AppError::Validation("x".into()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            AppError::SendMail(anyhow::anyhow!("smtp down")).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_user_already_exists_detail() {
        let err = AppError::user_already_exists("alice@example.com");
        assert_eq!(err.to_string(), "User [alice@example.com] already exists");
        assert_eq!(err.default_title(), "User already exists");
        assert_eq!(err.code(), "ERR-017");
    }

    #[test]
    fn test_store_error_translation() {
        let err: AppError = StoreError::NotFound { entity: "book" }.into();
        assert!(matches!(err, AppError::NotFound { entity: "book" }));

        let err: AppError = StoreError::MissingReference { entity: "author" }.into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err: AppError = StoreError::Database(sea_orm::DbErr::Custom("boom".into())).into();
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "internal server error");
    }
}
