//! Shared application state.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::chat::GeminiClient;
use crate::config::ServerConfig;
use laundry_db::Database;

/// Shared application state, cloned into every handler.
///
/// Everything inside is immutable after startup; the pool does its own
/// synchronization.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub chat: GeminiClient,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);
        let chat = GeminiClient::new(
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
        );

        AppState {
            db,
            jwt,
            chat,
            config: Arc::new(config),
        }
    }
}
