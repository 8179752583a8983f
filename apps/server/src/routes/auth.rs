//! Login and session lookup.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use laundry_core::{Role, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// The role the user signs in as; must match the stored role.
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let user = state
        .db
        .users()
        .verify_credentials(username, &request.password)
        .await?
        .filter(|user| user.role == request.role);

    let Some(user) = user else {
        warn!(username = %username, role = %request.role, "Login rejected");
        return Err(ApiError::unauthorized("Invalid username, password or role"));
    };

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(ApiResponse::ok(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.lifetime_secs(),
        user,
    }))
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> ApiResult<User> {
    let user = state
        .db
        .users()
        .get_by_id(&current.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session user no longer exists"))?;

    Ok(ApiResponse::ok(user))
}
