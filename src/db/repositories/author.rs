use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::db::{StoreError, StoreResult, now_rfc3339};
use crate::domain::AuthorId;
use crate::entities::authors;
use crate::models::{Author, AuthorInput};

const ENTITY: &str = "author";

pub struct AuthorRepository {
    conn: DatabaseConnection,
}

impl AuthorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<Author>> {
        let rows = authors::Entity::find()
            .filter(authors::Column::Deleted.eq(false))
            .order_by_asc(authors::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    pub async fn get(&self, id: AuthorId) -> StoreResult<Author> {
        authors::Entity::find_by_id(id.value())
            .filter(authors::Column::Deleted.eq(false))
            .one(&self.conn)
            .await?
            .map(Author::from)
            .ok_or(StoreError::NotFound { entity: ENTITY })
    }

    pub async fn create(&self, input: &AuthorInput) -> StoreResult<AuthorId> {
        let now = now_rfc3339();
        let model = authors::ActiveModel {
            name: Set(input.name.clone()),
            dob: Set(input.dob),
            deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .map_err(|e| StoreError::from_write(e, ENTITY, ENTITY))?;

        Ok(AuthorId::new(model.id))
    }

    pub async fn update(&self, id: AuthorId, input: &AuthorInput) -> StoreResult<()> {
        let result = authors::Entity::update_many()
            .col_expr(authors::Column::Name, Expr::value(input.name.as_str()))
            .col_expr(authors::Column::Dob, Expr::value(input.dob))
            .col_expr(authors::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(authors::Column::Id.eq(id.value()))
            .filter(authors::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound { entity: ENTITY });
        }
        Ok(())
    }

    /// Soft delete; a second delete of the same row reports `NotFound`.
    pub async fn delete(&self, id: AuthorId) -> StoreResult<()> {
        let result = authors::Entity::update_many()
            .col_expr(authors::Column::Deleted, Expr::value(true))
            .col_expr(authors::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(authors::Column::Id.eq(id.value()))
            .filter(authors::Column::Deleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound { entity: ENTITY });
        }
        Ok(())
    }
}
