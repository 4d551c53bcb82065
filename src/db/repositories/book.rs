use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::db::{StoreError, StoreResult, now_rfc3339};
use crate::domain::BookId;
use crate::entities::books;
use crate::models::{Book, BookInput};

const ENTITY: &str = "book";
const REFERENCE: &str = "author";

pub struct BookRepository {
    conn: DatabaseConnection,
}

impl BookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        let rows = books::Entity::find()
            .filter(books::Column::Deleted.eq(false))
            .order_by_asc(books::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    pub async fn get(&self, id: BookId) -> StoreResult<Book> {
        books::Entity::find_by_id(id.value())
            .filter(books::Column::Deleted.eq(false))
            .one(&self.conn)
            .await?
            .map(Book::from)
            .ok_or(StoreError::NotFound { entity: ENTITY })
    }

    pub async fn create(&self, input: &BookInput) -> StoreResult<BookId> {
        let now = now_rfc3339();
        let model = books::ActiveModel {
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            isbn: Set(input.isbn.clone()),
            author_id: Set(input.author_id.value()),
            price_cents: Set(input.price.cents()),
            deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .map_err(|e| StoreError::from_write(e, ENTITY, REFERENCE))?;

        Ok(BookId::new(model.id))
    }

    pub async fn update(&self, id: BookId, input: &BookInput) -> StoreResult<()> {
        let result = books::Entity::update_many()
            .col_expr(books::Column::Title, Expr::value(input.title.as_str()))
            .col_expr(books::Column::Description, Expr::value(input.description.as_str()))
            .col_expr(books::Column::Isbn, Expr::value(input.isbn.as_str()))
            .col_expr(books::Column::AuthorId, Expr::value(input.author_id.value()))
            .col_expr(books::Column::PriceCents, Expr::value(input.price.cents()))
            .col_expr(books::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(books::Column::Id.eq(id.value()))
            .filter(books::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await
            .map_err(|e| StoreError::from_write(e, ENTITY, REFERENCE))?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound { entity: ENTITY });
        }
        Ok(())
    }

    pub async fn delete(&self, id: BookId) -> StoreResult<()> {
        let result = books::Entity::update_many()
            .col_expr(books::Column::Deleted, Expr::value(true))
            .col_expr(books::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(books::Column::Id.eq(id.value()))
            .filter(books::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound { entity: ENTITY });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_store;
    use crate::domain::{AuthorId, Price};
    use crate::models::AuthorInput;
    use chrono::NaiveDate;

    fn input(author_id: AuthorId) -> BookInput {
        BookInput {
            title: "Twenty Thousand Leagues".to_string(),
            description: "Submarine adventure".to_string(),
            isbn: "9780140394078".to_string(),
            author_id,
            price: Price::from_cents(1599),
        }
    }

    #[tokio::test]
    async fn test_book_crud() {
        let store = temp_store().await;
        let author_id = store
            .authors()
            .create(&AuthorInput {
                name: "Jules Verne".to_string(),
                dob: NaiveDate::from_ymd_opt(1828, 2, 8).unwrap(),
            })
            .await
            .unwrap();
        let repo = store.books();

        let id = repo.create(&input(author_id)).await.unwrap();
        let book = repo.get(id).await.unwrap();
        assert_eq!(book.price, Price::from_cents(1599));
        assert_eq!(book.author_id, author_id);

        let mut changed = input(author_id);
        changed.price = Price::from_cents(999);
        repo.update(id, &changed).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().price.cents(), 999);

        repo.delete(id).await.unwrap();
        assert!(matches!(repo.get(id).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unknown_author_is_missing_reference() {
        let repo = temp_store().await.books();
        let err = repo.create(&input(AuthorId::new(404))).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "author" }));
    }
}
