//! Identity claims carried inside access tokens

use serde::{Deserialize, Serialize};

/// Non-secret identity fields embedded in a token.
///
/// Serialized as `{"subjectId", "email", "username"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Opaque unique user identifier
    pub subject_id: String,
    pub email: String,
    /// Display name shown to other users
    pub username: String,
}

impl IdentityClaims {
    pub fn new(
        subject_id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            username: username.into(),
        }
    }
}

/// Full token payload: identity plus timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}
