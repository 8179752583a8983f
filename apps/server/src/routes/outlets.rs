//! Outlet CRUD.

use axum::extract::{Path, State};

use super::Deleted;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use laundry_core::{Capability, Outlet, OutletInput};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Outlet>> {
    Ok(ApiResponse::ok(state.db.outlets().list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Outlet> {
    let outlet = state
        .db
        .outlets()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Outlet", &id))?;

    Ok(ApiResponse::ok(outlet))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(input): JsonBody<OutletInput>,
) -> ApiResult<Outlet> {
    user.require(Capability::ManageOutlets)?;
    input.validate()?;

    Ok(ApiResponse::ok(state.db.outlets().create(&input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<OutletInput>,
) -> ApiResult<Outlet> {
    user.require(Capability::ManageOutlets)?;
    input.validate()?;

    Ok(ApiResponse::ok(state.db.outlets().update(&id, &input).await?))
}

/// Blocked with 409 while packages or transactions reference the outlet.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    user.require(Capability::ManageOutlets)?;
    state.db.outlets().delete(&id).await?;

    Ok(ApiResponse::ok(Deleted { id }))
}
