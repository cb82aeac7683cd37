//! CLI settings
//!
//! Settings live in a TOML file, by default `<config dir>/drone/config.toml`.
//! Command-line flags and environment variables take precedence over the
//! file, and the file takes precedence over built-in defaults.

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Daemon host used when neither flags nor settings name one
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Daemon port used when neither flags nor settings name one
pub const DEFAULT_PORT: u16 = 9002;

/// Request timeout used when settings do not name one
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Manifest path used when `--config` is not given
pub const DEFAULT_MANIFEST: &str = "./config.json";

/// CLI settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Daemon host
    pub host: Option<String>,

    /// Daemon port
    pub port: Option<u16>,

    /// Default owner for deployments
    pub user: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl CliConfig {
    /// Load settings from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => match Self::default_config_path() {
                Some(p) => p,
                None => return Ok(CliConfig::default()),
            },
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig = toml::from_str(&contents).map_err(|e| {
                CliError::Config(format!("{}: {}", config_path.display(), e))
            })?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default settings file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("drone").join("config.toml"))
    }

    /// Host after applying the flag override
    pub fn resolve_host(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Port after applying the flag override
    pub fn resolve_port(&self, flag: Option<u16>) -> u16 {
        flag.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    /// Request timeout
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}
