//! Packaging error types

use std::path::PathBuf;
use thiserror::Error;

/// Packaging errors
#[derive(Debug, Error)]
pub enum PackError {
    /// Source path is missing or not a directory
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Gzip level out of range
    #[error("invalid compression level {0}, expected 0-9")]
    InvalidCompression(u32),

    /// Directory walk failed
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
