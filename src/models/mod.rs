pub mod author;
pub mod book;
pub mod user;

pub use author::{Author, AuthorInput};
pub use book::{Book, BookInput};
pub use user::{
    AccessGrant, CurrentUser, NewUser, User, UserInfo, UserProfile, UserRecord,
    UserStatus,
};
