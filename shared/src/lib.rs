//! Habit Tracker Shared Library
//!
//! Wire types and input validation rules shared between the backend
//! and API clients.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
