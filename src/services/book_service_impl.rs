//! `SeaORM` implementation of the `BookService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{Store, StoreError};
use crate::domain::{AuthorId, BookId};
use crate::error::AppError;
use crate::models::{Book, BookInput};
use crate::services::book_service::BookService;

pub struct SeaOrmBookService {
    store: Store,
}

impl SeaOrmBookService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_author(&self, id: AuthorId) -> Result<(), AppError> {
        match self.store.authors().get(id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                Err(AppError::BadRequest(format!("author {id} does not exist")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BookService for SeaOrmBookService {
    async fn list(&self) -> Result<Vec<Book>, AppError> {
        Ok(self.store.books().list().await?)
    }

    async fn get(&self, id: BookId) -> Result<Book, AppError> {
        Ok(self.store.books().get(id).await?)
    }

    async fn create(&self, input: BookInput) -> Result<BookId, AppError> {
        self.ensure_author(input.author_id).await?;
        let id = self.store.books().create(&input).await?;
        info!(book_id = %id, author_id = %input.author_id, "Book created");
        Ok(id)
    }

    async fn update(&self, id: BookId, input: BookInput) -> Result<(), AppError> {
        self.ensure_author(input.author_id).await?;
        self.store.books().update(id, &input).await?;
        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<(), AppError> {
        self.store.books().delete(id).await?;
        info!(book_id = %id, "Book deleted");
        Ok(())
    }
}
