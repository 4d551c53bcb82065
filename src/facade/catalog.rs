use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::types::{
    AuthorDto, AuthorRequest, AuthorSummaryDto, BookDto, BookRequest, BookSummaryDto,
    CreatedResponse,
};
use crate::domain::{AuthorId, BookId};
use crate::error::AppResult;
use crate::models::{Author, AuthorInput, Book, BookInput};
use crate::services::{AuthorService, BookService};

/// Author and book endpoints, mapped between wire DTOs and domain models.
pub struct CatalogFacade {
    authors: Arc<dyn AuthorService>,
    books: Arc<dyn BookService>,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            dob: author.dob,
        }
    }
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            isbn: book.isbn,
            author_id: book.author_id,
            price: book.price,
        }
    }
}

impl From<AuthorRequest> for AuthorInput {
    fn from(req: AuthorRequest) -> Self {
        Self {
            name: req.name,
            dob: req.dob,
        }
    }
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            isbn: req.isbn,
            author_id: AuthorId::new(req.author_id),
            price: req.price,
        }
    }
}

impl CatalogFacade {
    #[must_use]
    pub fn new(authors: Arc<dyn AuthorService>, books: Arc<dyn BookService>) -> Self {
        Self { authors, books }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<AuthorSummaryDto>> {
        trace!("GetAuthors");

        let authors = self.authors.list().await?;
        Ok(authors
            .into_iter()
            .map(|a| AuthorSummaryDto {
                id: a.id,
                name: a.name,
            })
            .collect())
    }

    pub async fn get_author(&self, id: AuthorId) -> AppResult<AuthorDto> {
        debug!(author_id = %id, "GetAuthor");
        Ok(self.authors.get(id).await?.into())
    }

    pub async fn create_author(&self, req: AuthorRequest) -> AppResult<CreatedResponse> {
        debug!(?req, "CreateAuthor");

        let id = self.authors.create(req.into()).await?;
        Ok(CreatedResponse { id: id.value() })
    }

    pub async fn update_author(&self, id: AuthorId, req: AuthorRequest) -> AppResult<()> {
        debug!(author_id = %id, "UpdateAuthor");
        self.authors.update(id, req.into()).await
    }

    pub async fn delete_author(&self, id: AuthorId) -> AppResult<()> {
        debug!(author_id = %id, "DeleteAuthor");
        self.authors.delete(id).await
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookSummaryDto>> {
        trace!("GetBooks");

        let books = self.books.list().await?;
        Ok(books
            .into_iter()
            .map(|b| BookSummaryDto {
                id: b.id,
                title: b.title,
            })
            .collect())
    }

    pub async fn get_book(&self, id: BookId) -> AppResult<BookDto> {
        debug!(book_id = %id, "GetBook");
        Ok(self.books.get(id).await?.into())
    }

    pub async fn create_book(&self, req: BookRequest) -> AppResult<CreatedResponse> {
        debug!(?req, "CreateBook");

        let id = self.books.create(req.into()).await?;
        Ok(CreatedResponse { id: id.value() })
    }

    pub async fn update_book(&self, id: BookId, req: BookRequest) -> AppResult<()> {
        debug!(book_id = %id, "UpdateBook");
        self.books.update(id, req.into()).await
    }

    pub async fn delete_book(&self, id: BookId) -> AppResult<()> {
        debug!(book_id = %id, "DeleteBook");
        self.books.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_store;
    use crate::domain::Price;
    use crate::error::AppError;
    use crate::services::{SeaOrmAuthorService, SeaOrmBookService};
    use chrono::NaiveDate;

    async fn facade() -> CatalogFacade {
        let store = temp_store().await;
        CatalogFacade::new(
            Arc::new(SeaOrmAuthorService::new(store.clone())),
            Arc::new(SeaOrmBookService::new(store)),
        )
    }

    #[tokio::test]
    async fn test_author_and_book_lifecycle() {
        let catalog = facade().await;

        let author = catalog
            .create_author(AuthorRequest {
                name: "Ursula K. Le Guin".into(),
                dob: NaiveDate::from_ymd_opt(1929, 10, 21).unwrap(),
            })
            .await
            .unwrap();

        let book = catalog
            .create_book(BookRequest {
                title: "The Dispossessed".into(),
                description: "An ambiguous utopia".into(),
                isbn: "9780060512750".into(),
                author_id: author.id,
                price: Price::from_cents(1599),
            })
            .await
            .unwrap();

        let listed = catalog.list_books().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "The Dispossessed");

        let fetched = catalog.get_book(BookId::new(book.id)).await.unwrap();
        assert_eq!(fetched.author_id, AuthorId::new(author.id));
        assert_eq!(fetched.price.to_string(), "15.99");

        catalog.delete_book(BookId::new(book.id)).await.unwrap();
        assert!(matches!(
            catalog.get_book(BookId::new(book.id)).await,
            Err(AppError::NotFound { entity: "book" })
        ));

        let authors = catalog.list_authors().await.unwrap();
        assert_eq!(authors[0].name, "Ursula K. Le Guin");
    }
}
