//! Reports, spreadsheet export, outlet recap, member ranking and dashboard.
//!
//! Handlers only load rows; all aggregation lives in
//! [`laundry_core::report`].

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::export::{self, ExportFormat};
use crate::extract::QueryParams;
use crate::state::AppState;
use laundry_core::period::ReportPeriod;
use laundry_core::report::{self, Dashboard, OutletRecap, PeriodReport, TopMember};
use laundry_core::validation::validate_uuid;
use laundry_core::{Capability, TOP_MEMBERS_LIMIT};

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub period: Option<i64>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecapQuery {
    pub outlet_id: Option<String>,
}

/// `GET /api/reports?period=`
pub async fn period_report(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> ApiResult<PeriodReport> {
    user.require(Capability::GenerateReports)?;

    let period = ReportPeriod::parse(query.period)?;
    let now = Utc::now();
    let start = period.start(now);

    let details = state.db.transactions().list_since(start).await?;
    let total_members = state.db.members().count().await?;
    debug!(period = period.days(), %start, rows = details.len(), "Building report");

    Ok(ApiResponse::ok(report::build_report(
        details,
        total_members,
        period,
        now,
    )))
}

/// `GET /api/reports/export?period=&format=excel|csv`
///
/// `format` defaults to `excel`.
pub async fn export(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ExportQuery>,
) -> Result<Response, ApiError> {
    user.require(Capability::GenerateReports)?;

    let format = match query.format.as_deref().filter(|f| !f.trim().is_empty()) {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };

    let period = ReportPeriod::parse(query.period)?;
    let details = state
        .db
        .transactions()
        .list_since(period.start(Utc::now()))
        .await?;

    let body = format.render(&details).map_err(|e| {
        tracing::error!(error = %e, ?format, "Failed to render export");
        ApiError::internal("Failed to render export")
    })?;
    debug!(?format, rows = details.len(), bytes = body.len(), "Export rendered");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::report_filename(period.days(), format)
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// `GET /api/recap?outlet_id=`
pub async fn recap(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<RecapQuery>,
) -> ApiResult<OutletRecap> {
    user.require(Capability::GenerateReports)?;

    let outlet_id = query
        .outlet_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation("outlet_id is required"))?;
    validate_uuid("outlet_id", &outlet_id)?;

    if state.db.outlets().get_by_id(&outlet_id).await?.is_none() {
        return Err(ApiError::not_found("Outlet", &outlet_id));
    }

    let details = state.db.transactions().list_paid_for_outlet(&outlet_id).await?;
    Ok(ApiResponse::ok(report::build_recap(&outlet_id, &details, Utc::now())))
}

/// `GET /api/members/top`
pub async fn top_members(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<TopMember>> {
    user.require(Capability::GenerateReports)?;

    let details = state.db.transactions().list_all().await?;
    Ok(ApiResponse::ok(report::rank_members(&details, TOP_MEMBERS_LIMIT)))
}

/// `GET /api/dashboard`
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Dashboard> {
    user.require(Capability::GenerateReports)?;

    let details = state.db.transactions().list_all().await?;
    let total_members = state.db.members().count().await?;

    Ok(ApiResponse::ok(report::build_dashboard(
        &details,
        total_members,
        Utc::now(),
    )))
}
