//! The run command: one sync session with signal-aware shutdown
//!
//! The session itself is synchronous and runs on a blocking worker; the
//! async shell exists only to observe SIGINT/SIGTERM and flip the
//! cancellation token so the in-flight transfer is killed and the lock
//! released before exit.

use std::path::PathBuf;

use colored::Colorize;
use tokio::signal;

use sync_core::{CancelToken, Error, SessionConfig, SessionOutcome, SyncOrchestrator};

use crate::error::{CliError, Result};

/// Overrides collected from flags and the original environment contract
/// (REMOTE_USER, REMOTE_HOST, ROUTES_FILE, SSH_KEY_FILE).
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub remote_user: Option<String>,
    pub remote_host: Option<String>,
    pub routes_file: Option<PathBuf>,
    pub ssh_key: Option<PathBuf>,
}

impl RunOverrides {
    fn apply(self, config: &mut SessionConfig) {
        if let Some(user) = self.remote_user {
            config.remote.user = user;
        }
        if let Some(host) = self.remote_host {
            config.remote.host = host;
        }
        if let Some(routes_file) = self.routes_file {
            config.routes_file = routes_file;
        }
        if let Some(ssh_key) = self.ssh_key {
            config.remote.ssh_key = ssh_key;
        }
    }
}

/// Run one sync session. Returns the process exit code.
pub fn run_session(
    mut config: SessionConfig,
    overrides: RunOverrides,
    if_idle: bool,
) -> Result<i32> {
    overrides.apply(&mut config);
    if config.remote.user.is_empty() {
        return Err(CliError::user(
            "remote user is not set (configure [remote] or set REMOTE_USER)",
        ));
    }
    if config.remote.host.is_empty() {
        return Err(CliError::user(
            "remote host is not set (configure [remote] or set REMOTE_HOST)",
        ));
    }

    if if_idle {
        // trigger semantics: report AlreadyRunning instead of queueing
        config.lock_timeout_secs = 0;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_with_signals(config, if_idle))
}

async fn run_with_signals(config: SessionConfig, if_idle: bool) -> Result<i32> {
    let cancel = CancelToken::new();
    let orchestrator = SyncOrchestrator::new(config);

    let worker_cancel = cancel.clone();
    let mut session = tokio::task::spawn_blocking(move || orchestrator.run(&worker_cancel));

    let joined = tokio::select! {
        joined = &mut session => joined,
        _ = shutdown_signal() => {
            tracing::warn!("termination signal received, stopping session");
            cancel.cancel();
            (&mut session).await
        }
    };

    let result = joined.map_err(|e| CliError::user(format!("session worker failed: {}", e)))?;

    match result {
        Ok(report) => match report.outcome {
            SessionOutcome::AllSucceeded => {
                println!(
                    "{} Synced {} route(s) in {}s",
                    "OK".green().bold(),
                    report.routes_total,
                    report.total_duration.as_secs()
                );
                Ok(0)
            }
            SessionOutcome::PartialFailure => {
                println!(
                    "{} {} of {} route(s) failed. See {} for details.",
                    "WARN".yellow().bold(),
                    report.failure_count,
                    report.routes_total,
                    "routesync logs".cyan()
                );
                Ok(1)
            }
        },
        Err(Error::LockTimeout { .. }) if if_idle => {
            println!(
                "{} Another sync is already running",
                "SKIP".yellow().bold()
            );
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve on SIGINT, and on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
