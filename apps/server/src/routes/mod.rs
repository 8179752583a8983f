//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Route Table                                    │
//! │                                                                         │
//! │  PUBLIC                                                                │
//! │  GET    /health                                                        │
//! │  POST   /api/auth/login                                                │
//! │                                                                         │
//! │  BEARER TOKEN (require_auth)                    capability             │
//! │  GET    /api/auth/me                            -                      │
//! │  GET    /api/outlets[/{id}]                     -                      │
//! │  POST/PUT/DELETE /api/outlets[/{id}]            manage_outlets         │
//! │  *      /api/members[/{id}]                     register_members       │
//! │  GET    /api/packages[/{id}]                    -                      │
//! │  POST/PUT/DELETE /api/packages[/{id}]           manage_packages        │
//! │  *      /api/users[/{id}]                       manage_users           │
//! │  *      /api/transactions[/{id}[/status|/payment]]  enter_transactions │
//! │  GET    /api/reports, /api/reports/export       generate_reports       │
//! │  GET    /api/recap, /api/members/top            generate_reports       │
//! │  GET    /api/dashboard, POST /api/chat          generate_reports       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod chat;
pub mod health;
pub mod members;
pub mod outlets;
pub mod packages;
pub mod reports;
pub mod transactions;
pub mod users;

#[cfg(test)]
mod tests;

use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use serde::Serialize;

use crate::auth::require_auth;
use crate::state::AppState;

/// Body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
}

/// Create the combined router (without the outer layers).
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        // Master data
        .route("/api/outlets", get(outlets::list).post(outlets::create))
        .route(
            "/api/outlets/{id}",
            get(outlets::get).put(outlets::update).delete(outlets::delete),
        )
        .route("/api/members", get(members::list).post(members::create))
        .route("/api/members/top", get(reports::top_members))
        .route(
            "/api/members/{id}",
            get(members::get).put(members::update).delete(members::delete),
        )
        .route("/api/packages", get(packages::list).post(packages::create))
        .route(
            "/api/packages/{id}",
            get(packages::get).put(packages::update).delete(packages::delete),
        )
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Counter
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get).delete(transactions::delete),
        )
        .route("/api/transactions/{id}/status", patch(transactions::update_status))
        .route("/api/transactions/{id}/payment", patch(transactions::update_payment))
        // Reporting
        .route("/api/reports", get(reports::period_report))
        .route("/api/reports/export", get(reports::export))
        .route("/api/recap", get(reports::recap))
        .route("/api/dashboard", get(reports::dashboard))
        .route("/api/chat", post(chat::chat))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}
