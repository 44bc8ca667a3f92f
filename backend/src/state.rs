//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything here is built once at startup and is read-only afterwards:
//! JWT keys are derived once and the bcrypt cost is fixed.

use crate::auth::{AuthError, JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::CredentialStore;
use std::sync::Arc;

/// Shared application state
///
/// All fields are Arc-backed so cloning per request is O(1).
#[derive(Clone)]
pub struct AppState {
    /// Where user records live (Postgres in production, memory in tests)
    pub store: Arc<dyn CredentialStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// bcrypt hasher at the configured cost
    pub passwords: PasswordService,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails with [`AuthError::Config`] if the auth settings are unusable.
    pub fn new(store: Arc<dyn CredentialStore>, config: AppConfig) -> Result<Self, AuthError> {
        config.auth.validate()?;

        let jwt = JwtService::from_config(&config.auth)?;
        let passwords = PasswordService::new(config.auth.bcrypt_cost)?;

        Ok(Self {
            store,
            config: Arc::new(config),
            jwt,
            passwords,
        })
    }

    #[inline]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }
}
