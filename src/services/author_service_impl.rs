//! `SeaORM` implementation of the `AuthorService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::AuthorId;
use crate::error::AppError;
use crate::models::{Author, AuthorInput};
use crate::services::author_service::AuthorService;

pub struct SeaOrmAuthorService {
    store: Store,
}

impl SeaOrmAuthorService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthorService for SeaOrmAuthorService {
    async fn list(&self) -> Result<Vec<Author>, AppError> {
        Ok(self.store.authors().list().await?)
    }

    async fn get(&self, id: AuthorId) -> Result<Author, AppError> {
        Ok(self.store.authors().get(id).await?)
    }

    async fn create(&self, input: AuthorInput) -> Result<AuthorId, AppError> {
        let id = self.store.authors().create(&input).await?;
        info!(author_id = %id, "Author created");
        Ok(id)
    }

    async fn update(&self, id: AuthorId, input: AuthorInput) -> Result<(), AppError> {
        self.store.authors().update(id, &input).await?;
        Ok(())
    }

    async fn delete(&self, id: AuthorId) -> Result<(), AppError> {
        self.store.authors().delete(id).await?;
        info!(author_id = %id, "Author deleted");
        Ok(())
    }
}
