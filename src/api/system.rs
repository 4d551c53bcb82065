use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::error::AppError;

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET /health/ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    state.store().ping().await.map_err(|e| {
        ApiError::new(AppError::internal(e))
            .with_title("Service not ready")
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
    })?;
    Ok("OK")
}
