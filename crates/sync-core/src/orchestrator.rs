//! Session orchestration
//!
//! One [`SyncOrchestrator::run`] call is one session: load the route
//! table, take the session lock, verify the remote is reachable, then
//! drive every route through the transfer runner in declaration order.
//! Route failures are isolated: route *i+1* runs no matter what happened
//! to route *i*. Configuration, lock, connectivity, and signal problems
//! abort the whole session instead.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::lock::SessionLock;
use crate::log::SessionLog;
use crate::probe::ConnectivityProbe;
use crate::routes::RouteTable;
use crate::transfer::{FailureReason, RouteOutcome, RouteResult, TransferRunner};

/// Terminal outcome of a session that reached the end of its route list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    AllSucceeded,
    PartialFailure,
}

/// Aggregate record of one finalized session.
///
/// Aborted sessions never produce a report; they surface as [`Error`]
/// values, with the abort reason durable in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub started_at: DateTime<Local>,
    pub outcome: SessionOutcome,
    pub routes_total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub route_results: Vec<RouteResult>,
    pub total_duration: Duration,
}

/// Drives one sync session end to end.
pub struct SyncOrchestrator {
    config: SessionConfig,
    log: SessionLog,
}

impl SyncOrchestrator {
    pub fn new(config: SessionConfig) -> Self {
        let log = SessionLog::new(&config.log_file);
        Self { config, log }
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one session to completion.
    ///
    /// # Errors
    ///
    /// `Config` when the route table is unusable (no lock is taken),
    /// `LockTimeout` when another session is still running,
    /// `Connectivity` when the remote never became reachable, and
    /// `Interrupted` when a termination signal arrived via `cancel`.
    pub fn run(&self, cancel: &CancelToken) -> Result<SessionReport> {
        let started_at = Local::now();
        let session_start = Instant::now();

        self.log.info("Starting sync process...")?;

        let table = match RouteTable::load(&self.config.routes_file) {
            Ok(table) => table,
            Err(e) => {
                self.log.error(&format!("Sync aborted: {}", e))?;
                return Err(e);
            }
        };
        self.log
            .info(&format!("Processing {} backup route(s)", table.len()))?;
        tracing::info!(routes = table.len(), "session starting");

        let lock = SessionLock::new(&self.config.lock_file);
        let _guard = match lock.acquire(self.config.lock_timeout()) {
            Ok(guard) => guard,
            Err(e) => {
                self.log
                    .error("Sync aborted: another sync is already running")?;
                return Err(e);
            }
        };

        self.log.info(&format!(
            "Testing SSH connection to {}",
            self.config.remote.target()
        ))?;
        let probe = ConnectivityProbe::for_endpoint(&self.config.remote, &self.config.probe);
        match probe.run(cancel) {
            Ok(()) => self.log.info("SSH connection successful")?,
            Err(Error::Interrupted) => return self.interrupted(),
            Err(e) => {
                self.log.error(&format!(
                    "SSH connection failed after {} attempts",
                    self.config.probe.max_attempts
                ))?;
                self.log.error("Sync aborted: remote host unreachable")?;
                return Err(e);
            }
        }

        let runner = TransferRunner::new(&self.config.remote, &self.config.transfer);
        let mut results: Vec<RouteResult> = Vec::with_capacity(table.len());

        for entry in table.entries() {
            if cancel.is_cancelled() {
                return self.interrupted();
            }

            match entry.validated() {
                Err(reason) => {
                    self.log.error(&format!(
                        "Route validation failed: {} -> {} ({})",
                        entry.source, entry.destination, reason
                    ))?;
                    results.push(RouteResult {
                        route: entry.clone(),
                        outcome: RouteOutcome::Failed {
                            reason: FailureReason::Validation {
                                reason: reason.to_string(),
                            },
                        },
                        duration: Duration::ZERO,
                    });
                }
                Ok(route) => {
                    self.log
                        .info(&format!("Starting sync: {} -> {}", route.source, route.destination))?;

                    let result = match runner.run(entry, &route, &self.log, cancel) {
                        Ok(result) => result,
                        Err(Error::Interrupted) => return self.interrupted(),
                        Err(e) => return Err(e),
                    };

                    let secs = result.duration.as_secs();
                    match &result.outcome {
                        RouteOutcome::Succeeded => self.log.success(&format!(
                            "Sync completed: {} -> {} ({}s)",
                            route.source, route.destination, secs
                        ))?,
                        RouteOutcome::Failed {
                            reason: FailureReason::Transfer { exit_code },
                        } => self.log.error(&format!(
                            "Sync failed: {} -> {} (exit code: {}, duration: {}s)",
                            route.source, route.destination, exit_code, secs
                        ))?,
                        RouteOutcome::Failed { reason } => self.log.error(&format!(
                            "Sync failed: {} -> {} ({})",
                            route.source, route.destination, reason
                        ))?,
                    }

                    results.push(result);
                }
            }
        }

        let success_count = results.iter().filter(|r| r.succeeded()).count();
        let failure_count = results.len() - success_count;
        let total_duration = session_start.elapsed();

        self.log.info(&format!(
            "Sync process completed - Success: {}, Failures: {}, Total Duration: {}s",
            success_count,
            failure_count,
            total_duration.as_secs()
        ))?;

        let outcome = if failure_count == 0 {
            self.log.success("All syncs completed successfully")?;
            SessionOutcome::AllSucceeded
        } else {
            self.log.warn("Some syncs failed. Check logs for details.")?;
            SessionOutcome::PartialFailure
        };
        tracing::info!(
            success = success_count,
            failures = failure_count,
            "session finalized"
        );

        Ok(SessionReport {
            started_at,
            outcome,
            routes_total: table.len(),
            success_count,
            failure_count,
            route_results: results,
            total_duration,
        })
    }

    /// Record the interruption markers; the lock guard releases on the
    /// way out of `run`.
    fn interrupted(&self) -> Result<SessionReport> {
        tracing::warn!("session interrupted by signal");
        self.log.warn("Sync interrupted by signal")?;
        self.log
            .error("Sync aborted: interrupted before completion")?;
        Err(Error::Interrupted)
    }
}
