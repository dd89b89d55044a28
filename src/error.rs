//! Error types for shelf

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the registry, profile and bin directory managers.
///
/// Recoverable per-line registry problems are not errors; they are collected
/// as [`crate::ParseWarning`] values on the parsed registry.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Registry file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{} is not readable: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Index {index} is out of range (registry has {len} entries)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to link {} -> {}: {source}", link.display(), target.display())]
    SymlinkFailure {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Script for '{entry}' not found at {}", path.display())]
    MissingReferencedScript { entry: String, path: PathBuf },

    #[error(
        "Line {line} of {} no longer matches the parsed entry\n\
         The registry changed since it was read; list it again and retry.",
        path.display()
    )]
    StaleEntry { path: PathBuf, line: usize },
}

impl ShelfError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ShelfError::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ShelfError> = std::result::Result<T, E>;
