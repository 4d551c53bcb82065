//! HS256 access tokens carrying the user id as subject.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::UserId;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id as a decimal string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: Duration,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, subject: UserId) -> Result<IssuedToken, AppError>;

    /// Checks signature, algorithm and expiry, then parses the subject.
    fn verify(&self, token: &str) -> Result<UserId, AppError>;
}

pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenIssuer {
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    fn sign(&self, claims: &AccessTokenClaims) -> Result<String, AppError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::internal(anyhow::anyhow!("JWT encode: {e}")))
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, subject: UserId) -> Result<IssuedToken, AppError> {
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AppError::internal(anyhow::anyhow!("token duration out of range")))?;

        let exp = now
            .checked_add(ttl_secs)
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("token expiry overflows")))?;

        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_in: self.ttl,
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, AppError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                AppError::InvalidToken
            })?;

        data.claims.sub.parse::<UserId>().map_err(|_| {
            debug!("Access token subject is not numeric");
            AppError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn issuer() -> JwtTokenIssuer {
        JwtTokenIssuer::new(SECRET, Duration::from_secs(3600))
    }

    #[test]
    fn test_roundtrip() {
        let issuer = issuer();
        let issued = issuer.issue(UserId::new(42)).unwrap();

        assert_eq!(issued.expires_in.as_secs(), 3600);
        assert_eq!(issuer.verify(&issued.token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_oversized_duration_is_internal_error() {
        let max = u64::try_from(i64::MAX).unwrap();
        for secs in [max, u64::MAX] {
            let issuer = JwtTokenIssuer::new(SECRET, Duration::from_secs(secs));
            let err = issuer.issue(UserId::new(1)).unwrap_err();
            assert!(err.is_internal());
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&AccessTokenClaims {
                sub: "42".into(),
                iat: now - 120,
                exp: now - 60,
            })
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&AccessTokenClaims {
                sub: "alice".into(),
                iat: now,
                exp: now + 60,
            })
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let other = JwtTokenIssuer::new("another-secret-another-secret-xx", Duration::from_secs(60));
        let token = other.issue(UserId::new(1)).unwrap().token;

        assert!(matches!(issuer().verify(&token), Err(AppError::InvalidToken)));
        assert!(matches!(issuer().verify("garbage"), Err(AppError::InvalidToken)));
    }
}
