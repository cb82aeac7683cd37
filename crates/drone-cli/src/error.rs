//! CLI error types

use drone_pack::PackError;
use drone_types::ManifestError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// HTTP transport error
    #[error("problem with request: {0}")]
    Http(#[from] reqwest::Error),

    /// Settings error
    #[error("Configuration error: {0}")]
    Config(String),

    /// App manifest could not be loaded
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Source packaging failed
    #[error("packaging failed: {0}")]
    Pack(#[from] PackError),

    /// Non-success response from the daemon
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Background task failed
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CliError::Api {
            status: 500,
            message: "drone crashed".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - drone crashed");
    }

    #[test]
    fn test_manifest_error_is_transparent() {
        let err = CliError::from(ManifestError::Invalid("app name is empty".into()));
        assert_eq!(err.to_string(), "invalid app manifest: app name is empty");
    }
}
