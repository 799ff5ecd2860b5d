//! Error types for the library.
//!
//! Only failures that stop work on a whole file live here. Problems inside a
//! file are diagnostics, see [`crate::diagnostics`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading programs or configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// A G-code file is missing or unreadable.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configuration file exists but cannot be read or parsed.
    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file watcher failed.
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// A background analysis task panicked or was cancelled.
    #[error("analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures reading a G-code or config file from disk
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
