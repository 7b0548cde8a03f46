//! Error types for sync-core
//!
//! Fatal kinds (`Config`, `LockTimeout`, `Connectivity`, `Interrupted`)
//! abort a whole session. Route-scoped failures never appear here; they
//! live in [`crate::RouteResult`] and are absorbed into the session's
//! aggregate counts.

use std::path::PathBuf;
use std::time::Duration;

/// Result type for sync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Route configuration unusable; raised before any lock is taken
    #[error("invalid route configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Another session still held the lock when the timeout elapsed
    #[error("another sync session holds the lock at {path} (waited {waited:?})")]
    LockTimeout { path: PathBuf, waited: Duration },

    /// The remote endpoint stayed unreachable for every probe attempt
    #[error("remote host {host} unreachable after {attempts} attempt(s)")]
    Connectivity { host: String, attempts: u32 },

    /// An external termination signal stopped the session
    #[error("sync session interrupted by signal")]
    Interrupted,

    /// Filesystem error from sync-fs
    #[error(transparent)]
    Fs(#[from] sync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}
