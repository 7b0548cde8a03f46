//! Monitoring commands: status, logs, clear-logs
//!
//! These expose the data contract the external monitoring surface
//! consumes: the derived status view and the raw session log.

use colored::Colorize;

use sync_core::{SessionConfig, SessionLog, StatusReporter, SyncState};

use crate::error::Result;

/// Show the derived sync status.
pub fn run_status(config: &SessionConfig, json: bool) -> Result<i32> {
    let reporter = StatusReporter::for_config(config);
    let status = reporter.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(0);
    }

    let label = match status.state {
        SyncState::Idle => "idle".dimmed(),
        SyncState::Running => "running".blue().bold(),
        SyncState::CompletedOk => "completed".green().bold(),
        SyncState::CompletedWithFailures => "completed with failures".yellow().bold(),
        SyncState::Aborted => "aborted".red().bold(),
    };
    println!("{} {}", "status:".bold(), label);

    if let Some(at) = status.last_run_at {
        println!("{} {}", "last run:".bold(), at);
    }
    if let (Some(success), Some(failures)) =
        (status.last_success_count, status.last_failure_count)
    {
        println!(
            "{} {} succeeded, {} failed",
            "last result:".bold(),
            success,
            failures
        );
    }

    Ok(0)
}

/// Print the session log, optionally only its tail.
pub fn run_logs(config: &SessionConfig, tail: Option<usize>) -> Result<i32> {
    let log = SessionLog::new(&config.log_file);
    for line in log.tail(tail)? {
        println!("{}", line);
    }
    Ok(0)
}

/// Truncate the session log, leaving the cleared marker.
pub fn run_clear_logs(config: &SessionConfig) -> Result<i32> {
    let log = SessionLog::new(&config.log_file);
    log.clear()?;
    println!("{} Session log cleared", "OK".green().bold());
    Ok(0)
}
