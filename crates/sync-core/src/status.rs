//! Derived sync status
//!
//! The monitoring surface never reads session state directly; there is
//! none. Status is reconstructed on demand from two observables: whether
//! the session lock is currently held, and the marker lines in the
//! session log. The log stays the single source of truth; this module is
//! a view over it.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::lock::SessionLock;
use crate::log::{SessionLog, TIMESTAMP_FORMAT};

/// Lifecycle states the monitoring surface can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No session has run since the log was created or cleared
    Idle,
    /// A session is in flight
    Running,
    /// The last session synced every route
    CompletedOk,
    /// The last session finished with at least one failed route
    CompletedWithFailures,
    /// The last session aborted before completing its routes
    Aborted,
}

/// Snapshot derived from the log and the lock. A view, not a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Start time of the most recent session, if any
    pub last_run_at: Option<NaiveDateTime>,
    /// Route successes of the most recent completed session
    pub last_success_count: Option<u32>,
    /// Route failures of the most recent completed session
    pub last_failure_count: Option<u32>,
}

/// Derives [`SyncStatus`] from the session log and lock marker.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    log: SessionLog,
    lock: SessionLock,
}

impl StatusReporter {
    pub fn new(log_path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            log: SessionLog::new(log_path),
            lock: SessionLock::new(lock_path),
        }
    }

    pub fn for_config(config: &SessionConfig) -> Self {
        Self::new(&config.log_file, &config.lock_file)
    }

    /// Reconstruct the current status.
    pub fn status(&self) -> Result<SyncStatus> {
        let lines = self.log.tail(None)?;

        let mut status = SyncStatus {
            state: SyncState::Idle,
            last_run_at: None,
            last_success_count: None,
            last_failure_count: None,
        };

        let mut state_known = lines.is_empty();

        // Newest-first: the first marker of each kind wins.
        for line in lines.iter().rev() {
            if !state_known {
                if let Some(state) = state_marker(line) {
                    status.state = state;
                    state_known = true;
                } else if line.contains("Starting sync process") {
                    // reached the session start without a verdict
                    status.state = SyncState::Running;
                    state_known = true;
                }
            }

            if status.last_success_count.is_none()
                && let Some((success, failures)) = parse_summary(line)
            {
                status.last_success_count = Some(success);
                status.last_failure_count = Some(failures);
            }

            if line.contains("Starting sync process") && status.last_run_at.is_none() {
                status.last_run_at = parse_timestamp(line);
            }
        }

        // Lines without any marker mean a session wrote output we cannot
        // classify; treat it as in flight, as the original did.
        if !state_known {
            status.state = SyncState::Running;
        }

        // A held lock always means a session is running right now.
        if self.lock.is_held() {
            status.state = SyncState::Running;
        }

        Ok(status)
    }
}

fn state_marker(line: &str) -> Option<SyncState> {
    if line.contains("All syncs completed successfully") {
        Some(SyncState::CompletedOk)
    } else if line.contains("Some syncs failed") {
        Some(SyncState::CompletedWithFailures)
    } else if line.contains("Sync aborted") {
        Some(SyncState::Aborted)
    } else if line.contains("Logs cleared") {
        Some(SyncState::Idle)
    } else {
        None
    }
}

fn parse_summary(line: &str) -> Option<(u32, u32)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"Sync process completed - Success: (\d+), Failures: (\d+)")
            .expect("summary pattern is valid")
    });

    let captures = re.captures(line)?;
    let success = captures[1].parse().ok()?;
    let failures = captures[2].parse().ok()?;
    Some((success, failures))
}

fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\]")
            .expect("timestamp pattern is valid")
    });

    let captures = re.captures(line)?;
    NaiveDateTime::parse_from_str(&captures[1], TIMESTAMP_FORMAT).ok()
}
