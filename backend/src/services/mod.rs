//! Business logic services
//!
//! Services coordinate the credential store, the password hasher and the
//! token issuer on behalf of the route handlers.

pub mod user;

pub use user::UserService;
