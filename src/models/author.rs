use chrono::NaiveDate;

use crate::domain::AuthorId;
use crate::entities::authors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub dob: NaiveDate,
}

impl From<authors::Model> for Author {
    fn from(model: authors::Model) -> Self {
        Self {
            id: AuthorId::new(model.id),
            name: model.name,
            dob: model.dob,
        }
    }
}

/// Fields accepted on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInput {
    pub name: String,
    pub dob: NaiveDate,
}
