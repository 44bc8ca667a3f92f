//! Authentication module
//!
//! Provides JWT-based authentication with bcrypt password hashing.

mod claims;
mod error;
pub mod jwt;
mod middleware;
pub mod password;

pub use claims::IdentityClaims;
pub use error::AuthError;
pub use jwt::JwtService;
pub use middleware::{auth_middleware, authenticate, bearer_token, AuthUser};
pub use password::PasswordService;
