//! Transfer-tool invocation for one route
//!
//! The tool (rsync by default) runs as a subprocess with the validated
//! source and destination as discrete argv elements; nothing is
//! interpolated through a shell. Child output is attached straight to the
//! session log file so it streams in as produced. The runner classifies
//! the exit status and never retries: a failed route is recorded and the
//! session moves on.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::config::{RemoteEndpoint, TransferOptions};
use crate::error::{Error, Result};
use crate::log::SessionLog;
use crate::routes::{RouteEntry, ValidatedRoute};

/// How often a running transfer is checked for completion or
/// cancellation.
const WAIT_POLL: Duration = Duration::from_millis(100);

/// Exit code reported when the tool died without one (signal) or never
/// started.
const NO_EXIT_CODE: i32 = -1;

/// Why a route failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FailureReason {
    /// Path validation rejected the route before any transfer ran
    Validation { reason: String },
    /// The transfer tool exited non-zero (or never started)
    Transfer { exit_code: i32 },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Validation { reason } => write!(f, "{}", reason),
            FailureReason::Transfer { exit_code } => write!(f, "exit code: {}", exit_code),
        }
    }
}

/// Outcome of one route attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RouteOutcome {
    Succeeded,
    Failed { reason: FailureReason },
}

/// Result of one route, appended in processing order and never revised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub route: RouteEntry,
    #[serde(flatten)]
    pub outcome: RouteOutcome,
    pub duration: Duration,
}

impl RouteResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == RouteOutcome::Succeeded
    }
}

/// Invokes the external transfer tool for one route.
pub struct TransferRunner<'a> {
    endpoint: &'a RemoteEndpoint,
    options: &'a TransferOptions,
}

impl<'a> TransferRunner<'a> {
    pub fn new(endpoint: &'a RemoteEndpoint, options: &'a TransferOptions) -> Self {
        Self { endpoint, options }
    }

    /// Full argv for one route. Trailing slashes make the tool copy
    /// directory contents rather than the directory itself.
    fn command(&self, route: &ValidatedRoute) -> Command {
        let mut cmd = Command::new(&self.options.tool);
        cmd.args(&self.options.args);
        for pattern in &self.options.excludes {
            cmd.arg(format!("--exclude={}", pattern));
        }
        cmd.arg("-e").arg(self.endpoint.remote_shell());
        cmd.arg(format!("{}/", route.source));
        cmd.arg(format!(
            "{}:{}/",
            self.endpoint.target(),
            route.destination
        ));
        cmd
    }

    /// Run the tool for `route`, streaming its output into `log`.
    ///
    /// Returns the classified [`RouteResult`]; only cancellation and a
    /// failure to wait on the child surface as errors.
    pub fn run(
        &self,
        entry: &RouteEntry,
        route: &ValidatedRoute,
        log: &SessionLog,
        cancel: &CancelToken,
    ) -> Result<RouteResult> {
        let started = Instant::now();

        let stdout = log.append_handle()?;
        let stderr = stdout.try_clone().map_err(Error::Io)?;

        let mut cmd = self.command(route);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        tracing::debug!(source = %route.source, destination = %route.destination, "transfer starting");

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                // A missing or unrunnable tool shows up per-route, the
                // same way the tool's own failures do.
                tracing::warn!(tool = %self.options.tool, error = %e, "transfer tool failed to start");
                return Ok(RouteResult {
                    route: entry.clone(),
                    outcome: RouteOutcome::Failed {
                        reason: FailureReason::Transfer {
                            exit_code: NO_EXIT_CODE,
                        },
                    },
                    duration: started.elapsed(),
                });
            }
        };

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Interrupted);
            }
            match child.try_wait().map_err(Error::Io)? {
                Some(status) => break status,
                None => thread::sleep(WAIT_POLL),
            }
        };

        let duration = started.elapsed();
        let outcome = if status.success() {
            RouteOutcome::Succeeded
        } else {
            RouteOutcome::Failed {
                reason: FailureReason::Transfer {
                    exit_code: status.code().unwrap_or(NO_EXIT_CODE),
                },
            }
        };

        Ok(RouteResult {
            route: entry.clone(),
            outcome,
            duration,
        })
    }
}
