//! Account routes for the authenticated caller
//!
//! Every route here sits behind the auth gate; see [`user_routes`].

use crate::auth::{auth_middleware, AuthUser};
use crate::error::{ApiJson, ApiResult};
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use habit_tracker_shared::types::{
    ChangePasswordRequest, MessageResponse, UpdateProfileRequest, UserProfile,
};

/// Create user routes, gated by [`auth_middleware`]
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// GET /api/users/profile
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.store(), &auth.identity).await?;
    Ok(Json(profile))
}

/// PUT /api/users/profile
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::update_profile(state.store(), &auth.identity, req).await?;
    Ok(Json(profile))
}

/// POST /api/users/change-password
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    UserService::change_password(&state, &auth.identity, req).await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
