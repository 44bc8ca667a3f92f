//! Database repositories
//!
//! The auth core reads user records through the [`CredentialStore`] trait.
//! Postgres backs it in production; an in-memory store backs tests.

pub mod memory;
pub mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use habit_tracker_shared::UserProfile;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryCredentialStore;
pub use user::PgCredentialStore;

/// User record as persisted by the credential store
#[derive(Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view of the record, without the hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Input for creating a user
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial profile change; `None` leaves the column untouched
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique field (email or username) is already taken
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lookup and persistence of user credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Returns `false` when no user has the given id.
    async fn update_password_hash(&self, id: Uuid, password_hash: &str)
        -> Result<bool, StoreError>;

    /// Apply `update` and return the new record, or `None` for an unknown id.
    /// A taken email or username is [`StoreError::Duplicate`].
    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
