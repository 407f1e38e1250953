//! Server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, so a bare `caja-server` starts a usable local instance.

use std::env;
use std::path::PathBuf;

/// REST server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Allowed CORS origin for the browser frontend; `None` allows any.
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            port: env::var("CAJA_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CAJA_PORT".to_string()))?,

            database_path: env::var("CAJA_DATABASE_PATH")
                .unwrap_or_else(|_| "./caja.db".to_string())
                .into(),

            cors_origin: env::var("CAJA_CORS_ORIGIN").ok(),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
