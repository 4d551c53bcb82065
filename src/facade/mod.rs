//! Orchestration between the HTTP handlers and the domain services.
//!
//! Facades own the mapping from request DTOs to domain models and back, and
//! compose several services into one user-facing flow.

pub mod auth;
pub mod catalog;
pub mod user;

pub use auth::AuthFacade;
pub use catalog::CatalogFacade;
pub use user::UserFacade;
