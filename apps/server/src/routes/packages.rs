//! Package CRUD. Listing is open to every signed-in user because the
//! counter needs the price list.

use axum::extract::{Path, State};

use super::Deleted;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use laundry_core::{Capability, Package, PackageInput};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Package>> {
    Ok(ApiResponse::ok(state.db.packages().list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Package> {
    let package = state
        .db
        .packages()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Package", &id))?;

    Ok(ApiResponse::ok(package))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(input): JsonBody<PackageInput>,
) -> ApiResult<Package> {
    user.require(Capability::ManagePackages)?;
    input.validate()?;

    Ok(ApiResponse::ok(state.db.packages().create(&input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<PackageInput>,
) -> ApiResult<Package> {
    user.require(Capability::ManagePackages)?;
    input.validate()?;

    Ok(ApiResponse::ok(state.db.packages().update(&id, &input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    user.require(Capability::ManagePackages)?;
    state.db.packages().delete(&id).await?;

    Ok(ApiResponse::ok(Deleted { id }))
}
