//! User service for authentication and account management
//!
//! Password hashing and verification run on the blocking thread pool.
//! The credential store and hasher come from [`AppState`].

use crate::auth::{AuthError, IdentityClaims, PasswordService};
use crate::error::ApiError;
use crate::repositories::{CredentialStore, NewUser, ProfileUpdate, UserRecord};
use crate::state::AppState;
use habit_tracker_shared::types::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    UserProfile,
};
use habit_tracker_shared::validation;
use tracing::{info, warn};
use uuid::Uuid;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and issue their first token
    pub async fn register(state: &AppState, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let email = req.email.trim().to_lowercase();
        let username = req.username.trim().to_string();

        validation::validate_email(&email).map_err(ApiError::Validation)?;
        validation::validate_username(&username).map_err(ApiError::Validation)?;
        validation::validate_password(&req.password).map_err(ApiError::Validation)?;
        validation::validate_name(req.first_name.as_deref()).map_err(ApiError::Validation)?;
        validation::validate_name(req.last_name.as_deref()).map_err(ApiError::Validation)?;

        let password_hash = state.passwords().hash_async(req.password).await?;

        let user = state
            .store()
            .create(NewUser {
                email,
                username,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Self::auth_response(state, &user, "User registered successfully")
    }

    /// Login with email and password
    ///
    /// An unknown email and a wrong password produce the same error, after
    /// the same amount of hashing work.
    pub async fn login(state: &AppState, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        let email = req.email.trim().to_lowercase();

        validation::validate_email(&email).map_err(ApiError::Validation)?;
        validation::validate_login_password(&req.password).map_err(ApiError::Validation)?;

        let user = state.store().find_by_email(&email).await?;
        let user = check_password(state.passwords(), user, req.password).await?;

        info!(user_id = %user.id, "user logged in");
        Self::auth_response(state, &user, "Login successful")
    }

    /// Get the profile of the authenticated caller
    pub async fn get_profile(
        store: &dyn CredentialStore,
        identity: &IdentityClaims,
    ) -> Result<UserProfile, ApiError> {
        let user = find_subject(store, identity).await?;
        Ok(user.profile())
    }

    /// Change any of the caller's email, username and names
    ///
    /// Tokens issued earlier keep the old email and username until they expire.
    pub async fn update_profile(
        store: &dyn CredentialStore,
        identity: &IdentityClaims,
        req: UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        let update = ProfileUpdate {
            email: req.email.map(|e| e.trim().to_lowercase()),
            username: req.username.map(|u| u.trim().to_string()),
            first_name: req.first_name,
            last_name: req.last_name,
        };

        if let Some(email) = &update.email {
            validation::validate_email(email).map_err(ApiError::Validation)?;
        }
        if let Some(username) = &update.username {
            validation::validate_username(username).map_err(ApiError::Validation)?;
        }
        validation::validate_name(update.first_name.as_deref()).map_err(ApiError::Validation)?;
        validation::validate_name(update.last_name.as_deref()).map_err(ApiError::Validation)?;

        let user = find_subject(store, identity).await?;
        let updated = store
            .update_profile(user.id, update)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = %updated.id, "profile updated");
        Ok(updated.profile())
    }

    /// Replace the caller's password after re-checking the current one
    pub async fn change_password(
        state: &AppState,
        identity: &IdentityClaims,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        validation::validate_new_password(&req.new_password).map_err(ApiError::Validation)?;

        let user = find_subject(state.store(), identity).await?;
        let user = check_password(state.passwords(), Some(user), req.current_password).await?;

        let new_hash = state.passwords().hash_async(req.new_password).await?;
        if !state.store().update_password_hash(user.id, &new_hash).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    fn auth_response(
        state: &AppState,
        user: &UserRecord,
        message: &str,
    ) -> Result<AuthResponse, ApiError> {
        let identity = IdentityClaims::new(user.id.to_string(), &user.email, &user.username);
        let token = state.jwt().issue(&identity)?;

        Ok(AuthResponse {
            message: message.to_string(),
            user: user.profile(),
            token,
            expires_in: state.jwt().token_ttl_secs(),
        })
    }
}

/// Verify `password` against the stored hash, or against a dummy hash when
/// there is no such user. Both failures are [`AuthError::InvalidCredentials`].
async fn check_password(
    passwords: &PasswordService,
    user: Option<UserRecord>,
    password: String,
) -> Result<UserRecord, ApiError> {
    let Some(user) = user else {
        passwords.verify_dummy_async(password).await?;
        return Err(AuthError::InvalidCredentials.into());
    };

    if passwords
        .verify_async(password, user.password_hash.clone())
        .await?
    {
        Ok(user)
    } else {
        warn!(user_id = %user.id, "password verification failed");
        Err(AuthError::InvalidCredentials.into())
    }
}

/// Load the user a verified token refers to
async fn find_subject(
    store: &dyn CredentialStore,
    identity: &IdentityClaims,
) -> Result<UserRecord, ApiError> {
    // Signed by us but not one of our ids: treat like any other bad token
    let id = Uuid::parse_str(&identity.subject_id)
        .map_err(|_| ApiError::from(AuthError::Malformed))?;

    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::repositories::InMemoryCredentialStore;
    use std::sync::Arc;

    fn state() -> AppState {
        let mut config = AppConfig::default();
        config.auth.bcrypt_cost = 10;
        AppState::new(Arc::new(InMemoryCredentialStore::new()), config).unwrap()
    }

    fn register_request(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "Password123".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_verifiable_token() {
        let state = state();
        let response = UserService::register(&state, register_request("Ada@Example.com", "ada"))
            .await
            .unwrap();

        let identity = state.jwt().verify(&response.token).unwrap();
        assert_eq!(identity.subject_id, response.user.id);
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(response.expires_in, 7200);
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let state = state();
        UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();

        let stored = state
            .store()
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "Password123");
        assert!(state.passwords().verify("Password123", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let state = state();
        UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();

        let result =
            UserService::register(&state, register_request("ada@example.com", "other")).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_over_long_password() {
        let state = state();
        let mut req = register_request("ada@example.com", "ada");
        req.password = "a".repeat(73);

        let result = UserService::register(&state, req).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_succeeds_with_correct_password() {
        let state = state();
        UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();

        let response = UserService::login(&state, login_request("ada@example.com", "Password123"))
            .await
            .unwrap();
        assert_eq!(response.user.username, "ada");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = state();
        UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();

        let wrong_password =
            UserService::login(&state, login_request("ada@example.com", "WrongPass1")).await;
        let unknown_email =
            UserService::login(&state, login_request("nobody@example.com", "Password123")).await;

        match (wrong_password, unknown_email) {
            (Err(ApiError::Unauthorized(a)), Err(ApiError::Unauthorized(b))) => assert_eq!(a, b),
            other => panic!("expected two Unauthorized errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_change_password_rotates_credentials() {
        let state = state();
        let registered = UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();
        let identity = state.jwt().verify(&registered.token).unwrap();

        UserService::change_password(
            &state,
            &identity,
            ChangePasswordRequest {
                current_password: "Password123".to_string(),
                new_password: "NewPassword456".to_string(),
            },
        )
        .await
        .unwrap();

        let old = UserService::login(&state, login_request("ada@example.com", "Password123")).await;
        let new =
            UserService::login(&state, login_request("ada@example.com", "NewPassword456")).await;
        assert!(old.is_err());
        assert!(new.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_requires_current_password() {
        let state = state();
        let registered = UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();
        let identity = state.jwt().verify(&registered.token).unwrap();

        let result = UserService::change_password(
            &state,
            &identity,
            ChangePasswordRequest {
                current_password: "NotMyPassword1".to_string(),
                new_password: "NewPassword456".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_profile_normalizes_and_validates() {
        let state = state();
        let registered = UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();
        let identity = state.jwt().verify(&registered.token).unwrap();

        let profile = UserService::update_profile(
            state.store(),
            &identity,
            UpdateProfileRequest {
                email: Some("  Countess@Example.com ".to_string()),
                last_name: Some("Lovelace".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(profile.email, "countess@example.com");
        assert_eq!(profile.username, "ada");
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));

        let bad_username = UserService::update_profile(
            state.store(),
            &identity,
            UpdateProfileRequest {
                username: Some("no spaces allowed".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_username, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_taken_username_conflicts() {
        let state = state();
        UserService::register(&state, register_request("grace@example.com", "grace"))
            .await
            .unwrap();
        let registered = UserService::register(&state, register_request("ada@example.com", "ada"))
            .await
            .unwrap();
        let identity = state.jwt().verify(&registered.token).unwrap();

        let result = UserService::update_profile(
            state.store(),
            &identity,
            UpdateProfileRequest {
                username: Some("grace".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_profile_for_non_uuid_subject_is_forbidden() {
        let state = state();
        let identity = IdentityClaims::new("not-a-uuid", "a@b.com", "abc");

        let result = UserService::get_profile(state.store(), &identity).await;
        assert!(matches!(result, Err(ApiError::Forbidden(AuthError::Malformed))));
    }

    #[tokio::test]
    async fn test_profile_for_deleted_user_is_not_found() {
        let state = state();
        let identity = IdentityClaims::new(Uuid::new_v4().to_string(), "a@b.com", "abc");

        let result = UserService::get_profile(state.store(), &identity).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
