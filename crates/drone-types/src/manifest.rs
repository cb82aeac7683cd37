//! App manifest types
//!
//! A manifest is the JSON file (by default `./config.json`) that describes an
//! app to the daemon. The client only inspects a handful of fields; anything
//! else in the file is carried through to the daemon untouched.

use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// App manifest as read from `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// App name, used as the drone identifier in request paths
    pub name: String,

    /// Owner of the app (used by `deploy`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Where the daemon gets the app source from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,

    /// Lifecycle scripts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Scripts>,

    /// Domain the app is served under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Environment variables for the drone
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Keys the client does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Source-acquisition method for an app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Repository {
    /// Source is pushed from the client as a tarball
    Local {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
    },

    /// Daemon clones a git repository
    Git {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },

    /// Daemon downloads a remote tarball
    Tar { url: String },

    /// Daemon installs an npm package
    Npm { package: String },
}

impl Repository {
    /// Whether the source has to be uploaded by the client
    pub fn is_local(&self) -> bool {
        matches!(self, Repository::Local { .. })
    }

    /// Short name of the repository type
    pub fn kind(&self) -> &'static str {
        match self {
            Repository::Local { .. } => "local",
            Repository::Git { .. } => "git",
            Repository::Tar { .. } => "tar",
            Repository::Npm { .. } => "npm",
        }
    }
}

/// Lifecycle scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Scripts {
    /// Entry point started by the daemon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

impl AppConfig {
    /// Create a minimal manifest with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user: None,
            repository: None,
            scripts: None,
            domain: None,
            env: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse and validate a manifest from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, ManifestError> {
        let config: AppConfig =
            serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
                path: "<inline>".into(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|e| e.at_path(path))
    }

    /// Check that the manifest can be used to address a drone
    pub fn validate(&self) -> Result<(), ManifestError> {
        validate_name(&self.name)
    }

    /// Local source directory named by the repository, if any
    pub fn local_directory(&self) -> Option<&str> {
        match &self.repository {
            Some(Repository::Local { directory }) => directory.as_deref(),
            _ => None,
        }
    }
}

/// Validate an app name for use as a URL path segment
pub fn validate_name(name: &str) -> Result<(), ManifestError> {
    if name.is_empty() {
        return Err(ManifestError::Invalid("app name is empty".into()));
    }
    if name == "." || name == ".." {
        return Err(ManifestError::Invalid(format!(
            "app name '{}' is reserved",
            name
        )));
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(ManifestError::Invalid(format!(
            "app name '{}' must not contain '/' or whitespace",
            name
        )));
    }
    Ok(())
}
