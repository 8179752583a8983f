//! Counter transactions.
//!
//! ## Create Flow
//! ```text
//! NewTransaction (JSON)
//!       │ validate()                ← shape, quantities, amounts, ids
//!       ▼
//! outlet / member exist?            ← 400 "Invalid outlet" / "Invalid member"
//!       │
//!       ▼
//! load packages                     ← missing ones surface as "Invalid package"
//!       │
//!       ▼
//! NewTransaction::build()           ← snapshot prices, resolve discount
//!       │
//!       ▼
//! TransactionRepository::insert()   ← header + items, one store transaction
//! ```

use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::Deleted;
use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::{JsonBody, QueryParams};
use crate::state::AppState;
use laundry_core::{
    Capability, NewTransaction, Package, PaymentStatus, TransactionDetail, TransactionStatus,
};

const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: TransactionStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
}

/// `GET /api/transactions?limit=`
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Vec<TransactionDetail>> {
    user.require(Capability::EnterTransactions)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    Ok(ApiResponse::ok(state.db.transactions().list_recent(limit).await?))
}

/// `GET /api/transactions/{id}`
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<TransactionDetail> {
    user.require(Capability::EnterTransactions)?;

    let detail = state
        .db
        .transactions()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", &id))?;

    Ok(ApiResponse::ok(detail))
}

/// `POST /api/transactions`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<NewTransaction>,
) -> ApiResult<TransactionDetail> {
    user.require(Capability::EnterTransactions)?;
    request.validate()?;

    if state.db.outlets().get_by_id(&request.outlet_id).await?.is_none() {
        return Err(ApiError::validation("Invalid outlet"));
    }
    if let Some(member_id) = request.member_id.as_deref().filter(|m| !m.is_empty()) {
        if state.db.members().get_by_id(member_id).await?.is_none() {
            return Err(ApiError::validation("Invalid member"));
        }
    }

    let packages = load_packages(&state, &request).await?;
    let detail = request.build(&packages, Some(user.id.clone()), Utc::now())?;

    state.db.transactions().insert(&detail).await?;

    info!(
        id = %detail.transaction.id,
        invoice_code = %detail.transaction.invoice_code,
        items = detail.items.len(),
        total = detail.total,
        by = %user.username,
        "Transaction created"
    );

    // Reload for outlet and member names
    let stored = state
        .db
        .transactions()
        .get_detail(&detail.transaction.id)
        .await?
        .unwrap_or(detail);

    Ok(ApiResponse::ok(stored))
}

/// `PATCH /api/transactions/{id}/status`
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> ApiResult<TransactionDetail> {
    user.require(Capability::EnterTransactions)?;

    let detail = state.db.transactions().update_status(&id, update.status).await?;
    Ok(ApiResponse::ok(detail))
}

/// `PATCH /api/transactions/{id}/payment`
pub async fn update_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<PaymentUpdate>,
) -> ApiResult<TransactionDetail> {
    user.require(Capability::EnterTransactions)?;

    let detail = state
        .db
        .transactions()
        .update_payment(&id, update.payment_status)
        .await?;
    Ok(ApiResponse::ok(detail))
}

/// `DELETE /api/transactions/{id}`
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    user.require(Capability::EnterTransactions)?;

    state.db.transactions().delete(&id).await?;
    info!(id = %id, by = %user.username, "Transaction deleted");

    Ok(ApiResponse::ok(Deleted { id }))
}

/// Loads each distinct package the request references. Unknown ids are
/// left out so `build()` reports them.
async fn load_packages(state: &AppState, request: &NewTransaction) -> Result<Vec<Package>, ApiError> {
    let mut packages: Vec<Package> = Vec::new();

    for item in &request.items {
        if packages.iter().any(|p| p.id == item.package_id) {
            continue;
        }
        if let Some(package) = state.db.packages().get_by_id(&item.package_id).await? {
            packages.push(package);
        }
    }

    Ok(packages)
}
