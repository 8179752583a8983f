//! Staff account CRUD (admin only).

use axum::extract::{Path, State};
use tracing::info;

use super::Deleted;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use laundry_core::{Capability, User, UserInput};

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<User>> {
    user.require(Capability::ManageUsers)?;
    Ok(ApiResponse::ok(state.db.users().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<User> {
    user.require(Capability::ManageUsers)?;
    let found = state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &id))?;

    Ok(ApiResponse::ok(found))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(input): JsonBody<UserInput>,
) -> ApiResult<User> {
    user.require(Capability::ManageUsers)?;
    input.validate_create()?;

    let created = state.db.users().create(&input).await?;
    info!(by = %user.username, user_id = %created.id, role = %created.role, "User created");

    Ok(ApiResponse::ok(created))
}

/// Leaving `password` empty keeps the current one.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UserInput>,
) -> ApiResult<User> {
    user.require(Capability::ManageUsers)?;
    input.validate_update()?;

    Ok(ApiResponse::ok(state.db.users().update(&id, &input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    user.require(Capability::ManageUsers)?;
    if id == user.id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    state.db.users().delete(&id).await?;
    info!(by = %user.username, user_id = %id, "User deleted");

    Ok(ApiResponse::ok(Deleted { id }))
}
