//! Remote reachability probe
//!
//! Runs once per session, before any route is touched: a session never
//! starts partial transfer work against an endpoint that is down. Each
//! attempt is one bounded-timeout subprocess; attempts repeat on a fixed
//! interval until the budget is spent.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::config::{ProbeSettings, RemoteEndpoint};
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, retry_bounded};

/// How often a running check is re-examined for completion.
const WAIT_POLL: Duration = Duration::from_millis(100);

/// An external command as a program plus discrete arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build the spec from a flat `[program, arg...]` vector, as written
    /// in configuration files.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Bounded-retry reachability check against the remote endpoint.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    command: CommandSpec,
    host: String,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl ConnectivityProbe {
    /// Probe `endpoint` with the standard SSH check, honoring any check
    /// command override in `settings`.
    pub fn for_endpoint(endpoint: &RemoteEndpoint, settings: &ProbeSettings) -> Self {
        let command = settings
            .command
            .as_deref()
            .and_then(CommandSpec::from_argv)
            .unwrap_or_else(|| {
                let mut args = endpoint.ssh_args();
                args.push(endpoint.target());
                args.push("echo ok".to_string());
                CommandSpec::new("ssh", args)
            });

        Self {
            command,
            host: endpoint.host.clone(),
            policy: settings.policy(),
            attempt_timeout: settings.attempt_timeout(),
        }
    }

    /// Probe with a caller-supplied check command.
    pub fn with_command(
        command: CommandSpec,
        host: impl Into<String>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            command,
            host: host.into(),
            policy,
            attempt_timeout,
        }
    }

    /// Run the probe to completion.
    ///
    /// # Errors
    ///
    /// `Error::Connectivity` after every attempt has failed, or
    /// `Error::Interrupted` when `cancel` fired while probing.
    pub fn run(&self, cancel: &CancelToken) -> Result<()> {
        retry_bounded(self.policy, cancel, |attempt| {
            if cancel.is_cancelled() {
                return Err(());
            }
            tracing::debug!(
                host = %self.host,
                attempt,
                max_attempts = self.policy.max_attempts,
                "connectivity check"
            );
            if self.attempt(cancel) { Ok(()) } else { Err(()) }
        })
        .map_err(|_| {
            if cancel.is_cancelled() {
                Error::Interrupted
            } else {
                Error::Connectivity {
                    host: self.host.clone(),
                    attempts: self.policy.max_attempts,
                }
            }
        })
    }

    /// One bounded-timeout check. A check that outlives its budget (or
    /// gets cancelled) is killed and counts as a failure.
    fn attempt(&self, cancel: &CancelToken) -> bool {
        let spawned = self
            .command
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "check did not start");
                return false;
            }
        };

        let deadline = Instant::now() + self.attempt_timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        tracing::debug!(host = %self.host, code = ?status.code(), "check failed");
                    }
                    return status.success();
                }
                Ok(None) if cancel.is_cancelled() || Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::debug!(host = %self.host, "check timed out");
                    return false;
                }
                Ok(None) => thread::sleep(WAIT_POLL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::debug!(host = %self.host, error = %e, "check wait failed");
                    return false;
                }
            }
        }
    }
}
