//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use cachet_infra::{ConfigError, ConnectionConfig};

/// Port the RPC surface listens on unless `PORT` says otherwise.
pub const DEFAULT_PORT: u16 = 50051;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_timeout: Duration,
    pub backend: ConnectionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT")?.unwrap_or(DEFAULT_PORT),
            shutdown_timeout: Duration::from_secs(
                parse_env("SHUTDOWN_TIMEOUT_SECS")?.unwrap_or(30),
            ),
            backend: ConnectionConfig::from_env()?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        _ => Ok(None),
    }
}
