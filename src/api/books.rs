use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::error::ProblemTitle;
use super::extract::{EntityId, ValidJson};
use super::types::{BookDto, BookRequest, BookSummaryDto, CreatedResponse};
use super::{ApiError, AppState};
use crate::domain::BookId;

/// GET /book
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookSummaryDto>>, ApiError> {
    let books = state
        .shared
        .catalog_facade
        .list_books()
        .await
        .titled("Problem getting books")?;
    Ok(Json(books))
}

/// GET /book/{id}
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<BookDto>, ApiError> {
    let book = state
        .shared
        .catalog_facade
        .get_book(BookId::new(id))
        .await
        .titled("Problem getting book")?;
    Ok(Json(book))
}

/// POST /book
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<BookRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let created = state
        .shared
        .catalog_facade
        .create_book(payload)
        .await
        .titled("Problem creating book")?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /book/{id}
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    ValidJson(payload): ValidJson<BookRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .catalog_facade
        .update_book(BookId::new(id), payload)
        .await
        .titled("Problem updating book")?;
    Ok(StatusCode::OK)
}

/// DELETE /book/{id}
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state
        .shared
        .catalog_facade
        .delete_book(BookId::new(id))
        .await
        .titled("Problem deleting book")?;
    Ok(StatusCode::OK)
}
