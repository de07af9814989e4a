use std::path::PathBuf;

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth_mode: AuthMode,
    /// Maximum cover upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub cors_origin: CorsOrigin,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the redb file
    pub data_dir: String,
    /// Directory for uploaded covers
    pub covers_dir: String,
    /// Image served when a book has no cover (open mode only)
    pub default_cover: PathBuf,
}

/// How callers are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No identity; every caller sees and may change every book.
    Open,
    /// The `Authorization` header names the caller; ownership and visibility apply.
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    Any,
    Exact(HeaderValue),
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            covers_dir: "./covers".to_string(),
            default_cover: PathBuf::from("./covers/default.jpg"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            cors_origin: CorsOrigin::Any,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(addr) => addr,
            Err(_) => {
                let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
                format!("0.0.0.0:{port}")
            }
        };

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let covers_dir = std::env::var("COVERS_DIR").unwrap_or_else(|_| "./covers".to_string());

        let default_cover = std::env::var("DEFAULT_COVER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&covers_dir).join("default.jpg"));

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // 10MB

        let auth_mode = parse_auth_mode(
            &std::env::var("AUTH_MODE").unwrap_or_else(|_| "open".to_string()),
        )?;

        let cors_origin = parse_cors_origin(
            &std::env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
        )?;

        let config = Config {
            server: ServerConfig {
                bind_address,
                cors_origin,
            },
            storage: StorageConfig {
                data_dir,
                covers_dir,
                default_cover,
            },
            auth_mode,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }

        if self.storage.covers_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "COVERS_DIR cannot be empty".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if matches!(self.auth_mode, AuthMode::Open) {
            tracing::warn!("AUTH_MODE=open: every caller can modify every book");
        }

        Ok(())
    }
}

fn parse_auth_mode(raw: &str) -> Result<AuthMode, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "open" | "none" | "" => Ok(AuthMode::Open),
        "header" => Ok(AuthMode::Header),
        other => Err(ConfigError::ValidationError(format!(
            "AUTH_MODE must be 'open' or 'header', got '{other}'"
        ))),
    }
}

fn parse_cors_origin(raw: &str) -> Result<CorsOrigin, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "*" {
        return Ok(CorsOrigin::Any);
    }
    HeaderValue::from_str(raw)
        .map(CorsOrigin::Exact)
        .map_err(|_| {
            ConfigError::ValidationError(format!("CORS_ALLOWED_ORIGIN '{raw}' is not a valid origin"))
        })
}
