use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;
use visualmath_core::NavigationPolicy;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Optional directory of extra curated sequences (`*.json`).
    pub catalog_path: Option<PathBuf>,
    pub navigation_policy: NavigationPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let catalog_path = std::env::var("CATALOG_PATH").ok().map(PathBuf::from);
        if let Some(path) = &catalog_path {
            if !path.is_dir() {
                return Err(ConfigError::InvalidValue(
                    "CATALOG_PATH".to_string(),
                    format!("'{}' is not a directory", path.display()),
                ));
            }
        }

        let navigation_policy = match std::env::var("NAVIGATION_POLICY") {
            Ok(value) => value
                .parse::<NavigationPolicy>()
                .map_err(|e| ConfigError::InvalidValue("NAVIGATION_POLICY".to_string(), e))?,
            Err(_) => NavigationPolicy::default(),
        };

        Ok(Self {
            bind_address,
            log_level,
            catalog_path,
            navigation_policy,
        })
    }
}
