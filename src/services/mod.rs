pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::AuthService;
pub use auth_service_impl::SeaOrmAuthService;

pub mod otp_service;
pub mod otp_service_impl;
pub use otp_service::{OtpPurpose, OtpService};
pub use otp_service_impl::CacheOtpService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::UserService;
pub use user_service_impl::SeaOrmUserService;

pub mod author_service;
pub mod author_service_impl;
pub use author_service::AuthorService;
pub use author_service_impl::SeaOrmAuthorService;

pub mod book_service;
pub mod book_service_impl;
pub use book_service::BookService;
pub use book_service_impl::SeaOrmBookService;
