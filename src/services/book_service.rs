use async_trait::async_trait;

use crate::domain::BookId;
use crate::error::AppError;
use crate::models::{Book, BookInput};

#[async_trait]
pub trait BookService: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, AppError>;

    async fn get(&self, id: BookId) -> Result<Book, AppError>;

    /// Rejects an unknown or deleted author with `BadRequest`.
    async fn create(&self, input: BookInput) -> Result<BookId, AppError>;

    async fn update(&self, id: BookId, input: BookInput) -> Result<(), AppError>;

    async fn delete(&self, id: BookId) -> Result<(), AppError>;
}
