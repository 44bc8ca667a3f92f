//! Authentication middleware
//!
//! Provides Axum middleware for bearer-token verification and the
//! [`AuthUser`] extractor that handlers use to read the caller's identity.
//!
//! A request moves through: header extracted → token verified →
//! identity attached. Any failure short-circuits before the handler runs.

use super::claims::IdentityClaims;
use super::error::AuthError;
use super::jwt::JwtService;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

/// Identity of the authenticated caller, scoped to one request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: IdentityClaims,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively and exactly one token segment
/// must follow it. Anything else is [`AuthError::MissingCredential`].
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MissingCredential),
    }
}

/// Run the full gate over a set of request headers.
pub fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers).map_err(|e| {
        debug!("request has no bearer credential");
        e
    })?;

    let identity = jwt.verify(token).map_err(|e| {
        warn!(reason = %e, "bearer token rejected");
        e
    })?;

    debug!(subject_id = %identity.subject_id, "request authenticated");
    Ok(AuthUser { identity })
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already attached by `auth_middleware`
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        Ok(authenticate(&parts.headers, app_state.jwt())?)
    }
}

/// Middleware function for authentication
///
/// Apply with `axum::middleware::from_fn_with_state` to a group of routes.
/// On success the caller's [`AuthUser`] is inserted into the request
/// extensions before the inner service runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), state.jwt())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
