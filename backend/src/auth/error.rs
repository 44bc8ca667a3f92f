//! Authentication failure kinds
//!
//! Every failure the auth core can produce is one of these variants.
//! The HTTP mapping lives in [`crate::error::ApiError`]; the Display text
//! here is for server-side logs and never contains token or secret material.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login with an unknown identifier or a wrong password.
    /// Both cases are deliberately reported the same way.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No usable bearer credential on the request.
    #[error("missing or malformed authorization header")]
    MissingCredential,

    /// Token could not be parsed or its claims are incomplete.
    #[error("malformed token")]
    Malformed,

    /// Token signature does not match.
    #[error("bad token signature")]
    BadSignature,

    /// Token signature is valid but the token is past its expiry.
    #[error("token expired")]
    Expired,

    /// Plaintext exceeds what the password hash can safely accept.
    #[error("input exceeds {max} bytes")]
    InputTooLong { max: usize },

    /// Unusable secret, cost factor or TTL. Fatal at startup.
    #[error("auth configuration error: {0}")]
    Config(String),

    /// Failure unrelated to the caller's input (hashing task, encoder).
    #[error("auth internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for the kinds that mean "a token was presented but rejected".
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Malformed | AuthError::BadSignature | AuthError::Expired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rejection_kinds() {
        assert!(AuthError::Malformed.is_token_rejection());
        assert!(AuthError::BadSignature.is_token_rejection());
        assert!(AuthError::Expired.is_token_rejection());
        assert!(!AuthError::MissingCredential.is_token_rejection());
        assert!(!AuthError::InvalidCredentials.is_token_rejection());
    }

    #[test]
    fn test_input_too_long_message() {
        let err = AuthError::InputTooLong { max: 72 };
        assert_eq!(err.to_string(), "input exceeds 72 bytes");
    }
}
