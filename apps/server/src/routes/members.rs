//! Member CRUD.

use axum::extract::{Path, State};

use super::Deleted;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use laundry_core::{Capability, Member, MemberInput};

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Member>> {
    user.require(Capability::RegisterMembers)?;
    Ok(ApiResponse::ok(state.db.members().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Member> {
    user.require(Capability::RegisterMembers)?;
    let member = state
        .db
        .members()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Member", &id))?;

    Ok(ApiResponse::ok(member))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(input): JsonBody<MemberInput>,
) -> ApiResult<Member> {
    user.require(Capability::RegisterMembers)?;
    input.validate()?;

    Ok(ApiResponse::ok(state.db.members().create(&input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<MemberInput>,
) -> ApiResult<Member> {
    user.require(Capability::RegisterMembers)?;
    input.validate()?;

    Ok(ApiResponse::ok(state.db.members().update(&id, &input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    user.require(Capability::RegisterMembers)?;
    state.db.members().delete(&id).await?;

    Ok(ApiResponse::ok(Deleted { id }))
}
