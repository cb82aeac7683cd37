//! Manifest error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating an app manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read
    #[error("problem reading: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or has the wrong shape
    #[error("problem parsing: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed but describes an unusable app
    #[error("invalid app manifest: {0}")]
    Invalid(String),
}

impl ManifestError {
    /// Attach a file path to a parse error produced from an in-memory string
    pub fn at_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ManifestError::Parse { source, .. } => ManifestError::Parse {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}
