//! Append-only session log
//!
//! The log is the durable record of every session and the sole data
//! source for the derived status view. Lines carry a timestamp, a level,
//! and a message:
//!
//! ```text
//! [2024-01-01 10:00:04] [INFO] Starting sync: /data1 -> /backup/data1
//! ```
//!
//! Transfer-tool output is streamed into the same file through a raw
//! append handle, so a long transfer is observable mid-flight.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;

/// Timestamp format used on every line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only structured log for sync sessions.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line at `level`.
    pub fn append(&self, level: LogLevel, message: &str) -> Result<()> {
        let line = format!(
            "[{}] [{}] {}",
            Local::now().format(TIMESTAMP_FORMAT),
            level,
            message
        );
        sync_fs::io::append_line(&self.path, &line)?;
        Ok(())
    }

    pub fn info(&self, message: &str) -> Result<()> {
        self.append(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> Result<()> {
        self.append(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> Result<()> {
        self.append(LogLevel::Error, message)
    }

    pub fn success(&self, message: &str) -> Result<()> {
        self.append(LogLevel::Success, message)
    }

    /// Raw append handle for streaming subprocess output into the log.
    pub fn append_handle(&self) -> Result<File> {
        Ok(sync_fs::io::open_append(&self.path)?)
    }

    /// Last `max_lines` lines (all lines when `None`). A missing log
    /// reads as empty.
    pub fn tail(&self, max_lines: Option<usize>) -> Result<Vec<String>> {
        Ok(sync_fs::io::read_tail(&self.path, max_lines)?)
    }

    /// Truncate the log, leaving a single cleared marker so the status
    /// view can tell "cleared" from "never ran".
    pub fn clear(&self) -> Result<()> {
        let line = format!(
            "[{}] [{}] Logs cleared",
            Local::now().format(TIMESTAMP_FORMAT),
            LogLevel::Info
        );
        sync_fs::io::truncate_with(&self.path, &line)?;
        Ok(())
    }
}
