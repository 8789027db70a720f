//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 4000)
    pub port: u16,
    /// Origin allowed by CORS, or "*" for any
    pub cors_origin: String,
}

/// Storage backend selector
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Path to SQLite database file
    pub sqlite_path: PathBuf,
    /// Directory holding users.json and tokens.json
    pub json_dir: PathBuf,
}

/// Session token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for token signatures (32+ bytes)
    pub token_secret: String,
    /// Token lifetime in seconds (default: 3600 = 1h)
    pub token_ttl_seconds: i64,
    /// Interval of the background allow-list sweep, 0 disables it
    pub sweep_interval_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (LENDAUTH__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("server.cors_origin", "http://localhost:3000")?
            .set_default("storage.backend", "sqlite")?
            .set_default("storage.sqlite_path", "data/lendauth.db")?
            .set_default("storage.json_dir", "data")?
            .set_default("auth.token_ttl_seconds", 3600)?
            .set_default("auth.sweep_interval_seconds", 300)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("LENDAUTH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;
        const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

        if self.auth.token_secret.len() < MIN_TOKEN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_secret must be at least {} bytes",
                MIN_TOKEN_SECRET_BYTES
            )));
        }

        if self.auth.token_ttl_seconds <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.token_ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_ttl_seconds must be at most {} (one year)",
                MAX_TOKEN_TTL_SECONDS
            )));
        }

        if self.server.cors_origin.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "server.cors_origin must not be empty".to_string(),
            ));
        }

        if self.auth.sweep_interval_seconds == 0 {
            tracing::warn!("auth.sweep_interval_seconds=0; background token sweep disabled");
        }

        Ok(())
    }
}
