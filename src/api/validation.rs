use regex::Regex;
use std::sync::OnceLock;

use super::types::{
    ActivateRequest, AuthorRequest, BookRequest, ReplacePasswordRequest, SigninRequest,
    SignupRequest, UserInfoDto, UsernameRequest,
};
use crate::error::AppError;

const OTP_LEN: usize = 64;

/// Request bodies that check their own field rules after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
            .expect("Invalid regex pattern defined in code")
    })
}

pub fn validate_email(field: &str, value: &str) -> Result<(), AppError> {
    if value.len() > 254 || !email_regex().is_match(value) {
        return Err(AppError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if !(min..=max).contains(&len) {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_otp(value: &str) -> Result<(), AppError> {
    if value.len() != OTP_LEN || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::Validation(format!(
            "otp must be {OTP_LEN} hexadecimal characters"
        )));
    }
    Ok(())
}

pub fn validate_id(field: &str, id: i64) -> Result<i64, AppError> {
    if id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid {field}: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

fn validate_password(field: &str, value: &str) -> Result<(), AppError> {
    validate_length(field, value, 8, 64)
}

fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    validate_length(field, value, 2, 64)
}

fn validate_text(field: &str, value: &str) -> Result<(), AppError> {
    validate_length(field, value, 1, 255)
}

impl Validate for SigninRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_email("username", &self.username)?;
        validate_password("password", &self.password)
    }
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_email("username", &self.username)?;
        validate_password("password", &self.password)?;
        validate_name("firstname", &self.firstname)?;
        validate_name("lastname", &self.lastname)
    }
}

impl Validate for ActivateRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_otp(&self.otp)
    }
}

impl Validate for UsernameRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_email("username", &self.username)
    }
}

impl Validate for ReplacePasswordRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_otp(&self.otp)?;
        validate_password("new_password", &self.new_password)
    }
}

impl Validate for UserInfoDto {
    fn validate(&self) -> Result<(), AppError> {
        validate_name("firstname", &self.firstname)?;
        validate_name("lastname", &self.lastname)?;
        validate_email("email", &self.email)
    }
}

impl Validate for AuthorRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text("name", &self.name)
    }
}

impl Validate for BookRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_text("title", &self.title)?;
        validate_text("description", &self.description)?;
        validate_text("isbn", &self.isbn)?;
        validate_id("author_id", self.author_id)?;
        if !self.price.is_positive() {
            return Err(AppError::Validation("price must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("username", "alice@example.com").is_ok());
        assert!(validate_email("username", "a.b+tag@sub.example.org").is_ok());
        assert!(validate_email("username", "alice").is_err());
        assert!(validate_email("username", "alice@").is_err());
        assert!(validate_email("username", "@example.com").is_err());
        assert!(validate_email("username", "alice@example").is_err());
        assert!(validate_email("username", "").is_err());
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp(&"a".repeat(64)).is_ok());
        assert!(validate_otp(&"A0".repeat(32)).is_ok());
        assert!(validate_otp(&"a".repeat(63)).is_err());
        assert!(validate_otp(&"g".repeat(64)).is_err());
    }

    #[test]
    fn test_password_bounds() {
        let req = |password: &str| SigninRequest {
            username: "alice@example.com".into(),
            password: password.into(),
        };
        assert!(req("Secret12").validate().is_ok());
        assert!(req("Secret1").validate().is_err());
        assert!(req(&"x".repeat(64)).validate().is_ok());
        assert!(req(&"x".repeat(65)).validate().is_err());
    }

    #[test]
    fn test_signup_name_bounds() {
        let mut req = SignupRequest {
            username: "alice@example.com".into(),
            password: "Secret123".into(),
            firstname: "Al".into(),
            lastname: "Liddell".into(),
        };
        assert!(req.validate().is_ok());
        req.firstname = "A".into();
        let err = req.validate().unwrap_err();
        assert_eq!(err.code(), "ERR-007");
    }

    #[test]
    fn test_book_rules() {
        let mut req = BookRequest {
            title: "Dune".into(),
            description: "Spice".into(),
            isbn: "9780441013593".into(),
            author_id: 1,
            price: Price::from_cents(999),
        };
        assert!(req.validate().is_ok());

        req.price = Price::from_cents(0);
        assert!(req.validate().is_err());

        req.price = Price::from_cents(999);
        req.author_id = 0;
        assert!(req.validate().is_err());

        req.author_id = 1;
        req.title = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("id", 5).unwrap(), 5);
        assert!(validate_id("id", 0).is_err());
        assert!(validate_id("id", -1).is_err());
    }
}
