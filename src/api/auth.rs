use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::ProblemTitle;
use super::extract::ValidJson;
use super::types::{
    ActivateRequest, ReplacePasswordRequest, SigninRequest, SigninResponse, SignupRequest,
    UsernameRequest,
};
use super::{ApiError, AppState};
use crate::error::AppError;
use crate::models::CurrentUser;

// ============================================================================
// Middleware
// ============================================================================

/// Bearer-token authentication for protected routes.
///
/// On success the resolved [`CurrentUser`] is stored in the request
/// extensions and recorded on the request span.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(AppError::MissingBearerToken)?;

    let user_id = state.shared.tokens.verify(token)?;

    let user = match state.shared.user_service.get_user_by_id(user_id).await {
        Ok(user) => user,
        Err(AppError::NotFound { .. }) => return Err(AppError::Unauthorized.into()),
        Err(e) => return Err(e.into()),
    };
    user.status.ensure_allowed()?;

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signin
pub async fn signin(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<SigninRequest>,
) -> Result<Json<SigninResponse>, ApiError> {
    let resp = state
        .shared
        .auth_facade
        .signin(payload)
        .await
        .titled("Problem signing in")?;
    Ok(Json(resp))
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<SignupRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .auth_facade
        .signup(payload)
        .await
        .titled("Problem signing up")?;
    Ok(StatusCode::CREATED)
}

/// POST /auth/activation/activate
pub async fn activate(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<ActivateRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .auth_facade
        .activate(payload)
        .await
        .titled("Problem activating user")?;
    Ok(StatusCode::OK)
}

/// POST /auth/activation/resend
pub async fn resend(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<UsernameRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .auth_facade
        .resend(payload)
        .await
        .titled("Problem resending activation")?;
    Ok(StatusCode::OK)
}

/// POST /auth/password/reset
pub async fn reset(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<UsernameRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .auth_facade
        .reset(payload)
        .await
        .titled("Problem resetting password")?;
    Ok(StatusCode::OK)
}

/// POST /auth/password/replace
pub async fn replace(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<ReplacePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .auth_facade
        .replace(payload)
        .await
        .titled("Problem replacing password")?;
    Ok(StatusCode::OK)
}
