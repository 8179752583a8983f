//! # SmartLaundry Server
//!
//! HTTP entry point.
//!
//! ```text
//! .env ──► ServerConfig::load() ──► Database::new() ──► build_app() ──► axum::serve
//!                                    (migrations)                         │
//!                                                     Ctrl+C / SIGTERM ───┘ graceful
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use laundry_db::{Database, DbConfig};
use laundry_server::{build_app, AppState, ServerConfig};

const DEFAULT_LOG_FILTER: &str = "info,laundry=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    init_tracing();

    info!("Starting SmartLaundry server...");

    // Load configuration
    let config = ServerConfig::load().context("invalid configuration")?;
    let addr = config.socket_addr()?;
    info!(
        %addr,
        database = %config.database_path,
        chat_enabled = config.gemini_api_key.is_some(),
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("JWT_SECRET is not set; using the development secret");
    }

    // Connect to database (runs migrations)
    let db_config = DbConfig::new(&config.database_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;
    info!("Database ready");

    let state = AppState::new(db.clone(), config);
    let app = build_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
