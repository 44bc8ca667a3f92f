//! JWT token issuance and verification
//!
//! Tokens are HS256-signed and carry [`IdentityClaims`] plus `iat`/`exp`.
//! Keys are pre-computed once at startup and shared via `Arc`.

use super::claims::{IdentityClaims, TokenClaims};
use super::error::AuthError;
use crate::config::AuthConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Minimum HMAC secret length in bytes
pub const MIN_SECRET_BYTES: usize = 32;

/// Default token lifetime (2 hours)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

/// Longest accepted token lifetime (5 years)
pub const MAX_TOKEN_TTL_SECS: i64 = 5 * 365 * 24 * 60 * 60;

/// Reject secrets too short to key HS256 safely.
pub fn ensure_secret_strength(secret: &[u8]) -> Result<(), AuthError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(AuthError::Config(format!(
            "JWT secret must be at least {} bytes",
            MIN_SECRET_BYTES
        )));
    }
    Ok(())
}

/// Turn a configured lifetime in seconds into a [`Duration`].
///
/// Accepts `1..=MAX_TOKEN_TTL_SECS`; anything else is [`AuthError::Config`].
pub fn ensure_ttl(secs: i64) -> Result<Duration, AuthError> {
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        return Err(AuthError::Config(format!(
            "token TTL must be between 1 and {} seconds, got {}",
            MAX_TOKEN_TTL_SECS, secs
        )));
    }
    Duration::try_seconds(secs)
        .ok_or_else(|| AuthError::Config(format!("token TTL out of range: {}", secs)))
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Issues and verifies identity tokens.
///
/// Cheap to clone; build once at startup and keep it in `AppState`.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    /// Create a service from a raw secret and default token lifetime.
    ///
    /// Fails with [`AuthError::Config`] on a short secret or a TTL outside
    /// `1..=MAX_TOKEN_TTL_SECS` seconds.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AuthError> {
        ensure_secret_strength(secret)?;
        if ttl <= Duration::zero() || ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(AuthError::Config(format!(
                "token TTL must be between 1 and {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Ok(Self {
            keys: JwtKeys::new(secret),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            ensure_ttl(config.token_ttl_secs)?,
        )
    }

    /// Mint a token for `identity` with the configured lifetime
    #[inline]
    pub fn issue(&self, identity: &IdentityClaims) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now(), self.ttl)
    }

    /// Mint a token for `identity` with an explicit lifetime
    #[inline]
    pub fn issue_with_ttl(
        &self,
        identity: &IdentityClaims,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now(), ttl)
    }

    fn issue_at(
        &self,
        identity: &IdentityClaims,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;

        let claims = TokenClaims {
            identity: identity.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| AuthError::Internal(format!("failed to encode token: {}", e)))
    }

    /// Verify signature then expiry, and return the embedded identity.
    ///
    /// No claim is deserialized before the signature has been checked.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        decode::<TokenClaims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims.identity)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })
    }

    /// Default token lifetime in seconds
    #[inline]
    pub fn token_ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
