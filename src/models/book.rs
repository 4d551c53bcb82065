use crate::domain::{AuthorId, BookId, Price};
use crate::entities::books;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub author_id: AuthorId,
    pub price: Price,
}

impl From<books::Model> for Book {
    fn from(model: books::Model) -> Self {
        Self {
            id: BookId::new(model.id),
            title: model.title,
            description: model.description,
            isbn: model.isbn,
            author_id: AuthorId::new(model.author_id),
            price: Price::from_cents(model.price_cents),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub author_id: AuthorId,
    pub price: Price,
}
