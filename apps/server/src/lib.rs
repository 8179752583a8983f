//! # SmartLaundry Server
//!
//! JSON API for the laundry shop: counter transactions, master data,
//! reports and the business assistant.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Server Layers                                  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  tower-http: TraceLayer (request spans) + CorsLayer              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │  ┌──────────────────────────────▼───────────────────────────────────┐  │
//! │  │  routes::create_router                                           │  │
//! │  │  public: /health, /api/auth/login                                │  │
//! │  │  protected: require_auth ──► CurrentUser ──► capability check    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │          ┌──────────────────────┼──────────────────────┐               │
//! │          ▼                      ▼                      ▼               │
//! │  ┌──────────────┐      ┌──────────────┐       ┌──────────────┐         │
//! │  │ laundry-core │      │  laundry-db  │       │ GeminiClient │         │
//! │  │ invoice math │      │  SQLite      │       │  (reqwest)   │         │
//! │  │ reports      │      │  repositories│       │              │         │
//! │  └──────────────┘      └──────────────┘       └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ServerConfig`]):
//! - `BIND_ADDR`, `PORT` - listen address (default: 0.0.0.0:3000)
//! - `DATABASE_PATH` - SQLite file (default: ./data/laundry.db)
//! - `JWT_SECRET`, `JWT_LIFETIME_SECS` - session tokens
//! - `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL` - assistant
//! - `CORS_ALLOW_ORIGIN` - browser origin allowed to call the API

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Builds the full application: routes plus tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_allow_origin.as_deref());

    routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Ignoring invalid CORS_ALLOW_ORIGIN, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
