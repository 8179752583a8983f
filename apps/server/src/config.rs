//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads a `.env` file first when one is present.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

/// Secret used when `JWT_SECRET` is unset. Fine for local development only.
pub const DEV_JWT_SECRET: &str = "smartlaundry-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing session tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Gemini API key; chat answers 503 without it
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    pub gemini_model: String,

    /// Gemini API base URL
    pub gemini_base_url: String,

    /// Allowed CORS origin; any origin when unset
    pub cors_allow_origin: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/laundry.db".to_string()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "43200".to_string()) // 12 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),

            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),

            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),

            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))
    }

    /// True when running with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 3000,
            database_path: ":memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 60,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: "http://localhost".to_string(),
            cors_allow_origin: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = sample();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = sample();
        config.bind_addr = "not an address".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = sample();
        config.jwt_lifetime_secs = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.jwt_secret.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = sample();
        config.gemini_api_key = Some("key-123".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("key-123"));
        assert!(!json.contains(DEV_JWT_SECRET));
    }
}
