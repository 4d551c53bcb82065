//! Request extractors that fail with problem documents instead of axum's
//! plain-text rejections.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::ApiError;
use super::validation::{Validate, validate_id};
use crate::error::AppError;
use crate::models::CurrentUser;

/// JSON body that has been decoded and validated.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    let error = match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType,
        other => AppError::Decode(other.body_text()),
    };
    ApiError::new(error)
}

/// Positive integer taken from the `{id}` path segment.
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("id must be a positive integer".into()))?;
        Ok(Self(validate_id("id", id)?))
    }
}

/// The caller resolved by the auth middleware. Missing means the route was
/// not behind the middleware, which is reported as `Unauthorized`.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::new(AppError::Unauthorized))
    }
}
