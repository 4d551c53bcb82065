//! Domain primitives for the catalog and account subsystems.
//!
//! Identifiers follow the newtype pattern so a `BookId` can never be passed
//! where a `UserId` is expected.

pub mod mask;
pub mod price;

pub use mask::mask;
pub use price::Price;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user; also the subject of access tokens.
    UserId
);

entity_id!(
    /// Identifier of an author record.
    AuthorId
);

entity_id!(
    /// Identifier of a book record.
    BookId
);

/// Lowercases a username so lookups and uniqueness are case-insensitive.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
