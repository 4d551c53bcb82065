//! Domain service for catalog authors.

use async_trait::async_trait;

use crate::domain::AuthorId;
use crate::error::AppError;
use crate::models::{Author, AuthorInput};

#[async_trait]
pub trait AuthorService: Send + Sync {
    async fn list(&self) -> Result<Vec<Author>, AppError>;

    async fn get(&self, id: AuthorId) -> Result<Author, AppError>;

    async fn create(&self, input: AuthorInput) -> Result<AuthorId, AppError>;

    async fn update(&self, id: AuthorId, input: AuthorInput) -> Result<(), AppError>;

    /// Soft delete. A second delete of the same author is `NotFound`.
    async fn delete(&self, id: AuthorId) -> Result<(), AppError>;
}
