//! Password hashing using bcrypt
//!
//! Provides salted, adaptive password hashing and verification.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Request handlers should use the
//! `*_async` variants, which run on the blocking thread pool.

use super::error::AuthError;
use std::sync::Arc;

/// Lowest accepted cost factor
pub const MIN_COST: u32 = 10;
/// Highest accepted cost factor
pub const MAX_COST: u32 = 20;
/// Cost factor used when none is configured
pub const DEFAULT_COST: u32 = 12;
pub use habit_tracker_shared::validation::MAX_PASSWORD_BYTES;

const DUMMY_PASSWORD: &str = "habit-tracker-dummy-password";

/// Reject cost factors outside [`MIN_COST`, `MAX_COST`].
pub fn ensure_cost(cost: u32) -> Result<(), AuthError> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(AuthError::Config(format!(
            "bcrypt cost must be between {} and {}, got {}",
            MIN_COST, MAX_COST, cost
        )));
    }
    Ok(())
}

/// Password hashing service
///
/// Every call to [`hash`](Self::hash) draws a fresh random salt, so the
/// same plaintext never produces the same output twice.
#[derive(Clone)]
pub struct PasswordService {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordService {
    /// Build a hasher at `cost`. Blocks for one hash to prepare the dummy
    /// hash used for unknown accounts.
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        ensure_cost(cost)?;
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {}", e)))?;

        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::InputTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {}", e)))
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Never fails: a malformed hash or an over-long password is `false`.
    /// The digest comparison inside bcrypt is constant-time.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))
    }

    /// Spend one verification's worth of work against a throwaway hash.
    ///
    /// Used when no stored hash exists so that an unknown account costs
    /// the same time as a wrong password.
    pub async fn verify_dummy_async(&self, password: String) -> Result<(), AuthError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || {
            service.verify(&password, &service.dummy_hash);
        })
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))
    }
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
