use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::error::ProblemTitle;
use super::extract::ValidJson;
use super::types::{UserInfoDto, UserResponse};
use super::{ApiError, AppState};
use crate::models::CurrentUser;

/// GET /user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Json<UserResponse> {
    Json(state.shared.user_facade.get_user(&current))
}

/// PUT /user/info
pub async fn update_info(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ValidJson(payload): ValidJson<UserInfoDto>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .user_facade
        .update_info(&current, payload)
        .await
        .titled("Problem updating user info")?;
    Ok(StatusCode::OK)
}
