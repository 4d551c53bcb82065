pub mod password;
pub mod token;

pub use password::{Argon2Hasher, PasswordHasher};
pub use token::{IssuedToken, JwtTokenIssuer, TokenIssuer};
