use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::error::ProblemTitle;
use super::extract::{EntityId, ValidJson};
use super::types::{AuthorDto, AuthorRequest, AuthorSummaryDto, CreatedResponse};
use super::{ApiError, AppState};
use crate::domain::AuthorId;

/// GET /author
pub async fn list_authors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AuthorSummaryDto>>, ApiError> {
    let authors = state
        .shared
        .catalog_facade
        .list_authors()
        .await
        .titled("Problem getting authors")?;
    Ok(Json(authors))
}

/// GET /author/{id}
pub async fn get_author(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<AuthorDto>, ApiError> {
    let author = state
        .shared
        .catalog_facade
        .get_author(AuthorId::new(id))
        .await
        .titled("Problem getting author")?;
    Ok(Json(author))
}

/// POST /author
pub async fn create_author(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<AuthorRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let created = state
        .shared
        .catalog_facade
        .create_author(payload)
        .await
        .titled("Problem creating author")?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /author/{id}
pub async fn update_author(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    ValidJson(payload): ValidJson<AuthorRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .catalog_facade
        .update_author(AuthorId::new(id), payload)
        .await
        .titled("Problem updating author")?;
    Ok(StatusCode::OK)
}

/// DELETE /author/{id}
pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .catalog_facade
        .delete_author(AuthorId::new(id))
        .await
        .titled("Problem deleting author")?;
    Ok(StatusCode::OK)
}
