//! Monitoring-surface tests: status derivation against real session logs
//!
//! The status view must let an external surface distinguish "never ran",
//! "running", "completed", "completed with failures", and "aborted" from
//! the log and lock alone.

#![cfg(unix)]

use std::time::Duration;

use sync_core::{
    CancelToken, ProbeSettings, RemoteEndpoint, SessionConfig, SessionLock, SessionLog,
    StatusReporter, SyncOrchestrator, SyncState, TransferOptions,
};
use sync_test_utils::SyncEnv;

fn config_for(env: &SyncEnv, tool: &str) -> SessionConfig {
    SessionConfig {
        remote: RemoteEndpoint::new("backup", "nas.test"),
        routes_file: env.routes_file(),
        log_file: env.log_file(),
        lock_file: env.lock_file(),
        probe: ProbeSettings {
            max_attempts: 1,
            interval_secs: 0,
            command: Some(vec!["true".to_string()]),
            ..ProbeSettings::default()
        },
        lock_timeout_secs: 0,
        transfer: TransferOptions {
            tool: tool.to_string(),
            args: vec![],
            excludes: vec![],
        },
    }
}

fn reporter_for(env: &SyncEnv) -> StatusReporter {
    StatusReporter::new(env.log_file(), env.lock_file())
}

#[test]
fn no_session_ever_ran_reads_as_idle() {
    let env = SyncEnv::new();
    let status = reporter_for(&env).status().unwrap();
    assert_eq!(status.state, SyncState::Idle);
    assert_eq!(status.last_run_at, None);
    assert_eq!(status.last_success_count, None);
}

#[test]
fn completed_session_reads_back_from_the_log() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);

    let config = config_for(&env, &env.fake_tool_ok().to_string_lossy());
    SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap();

    let status = reporter_for(&env).status().unwrap();
    assert_eq!(status.state, SyncState::CompletedOk);
    assert_eq!(status.last_success_count, Some(1));
    assert_eq!(status.last_failure_count, Some(0));
    assert!(status.last_run_at.is_some());
}

#[test]
fn partial_failure_session_reads_counts_from_the_log() {
    let env = SyncEnv::new();
    let good = env.add_source("data-a");
    let gone = env.missing_source("data-b");
    env.write_routes(&[
        (&good.to_string_lossy(), "/backup/a"),
        (&gone.to_string_lossy(), "/backup/b"),
    ]);

    let config = config_for(&env, &env.fake_tool_check_source().to_string_lossy());
    SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap();

    let status = reporter_for(&env).status().unwrap();
    assert_eq!(status.state, SyncState::CompletedWithFailures);
    assert_eq!(status.last_success_count, Some(1));
    assert_eq!(status.last_failure_count, Some(1));
}

#[test]
fn aborted_session_is_not_a_completion() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);

    let mut config = config_for(&env, &env.fake_tool_ok().to_string_lossy());
    config.probe = ProbeSettings {
        max_attempts: 2,
        interval_secs: 0,
        command: Some(vec!["false".to_string()]),
        ..ProbeSettings::default()
    };

    SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap_err();

    let status = reporter_for(&env).status().unwrap();
    assert_eq!(status.state, SyncState::Aborted);
    // no summary line was ever written
    assert_eq!(status.last_success_count, None);
}

#[test]
fn held_lock_reports_running() {
    let env = SyncEnv::new();
    let lock = SessionLock::new(env.lock_file());
    let _guard = lock.acquire(Duration::ZERO).unwrap();

    let status = reporter_for(&env).status().unwrap();
    assert_eq!(status.state, SyncState::Running);
}

#[test]
fn cleared_log_resets_to_idle() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);

    let config = config_for(&env, &env.fake_tool_ok().to_string_lossy());
    SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap();

    let log = SessionLog::new(env.log_file());
    log.clear().unwrap();

    let status = reporter_for(&env).status().unwrap();
    assert_eq!(status.state, SyncState::Idle);

    let lines = log.tail(None).unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Logs cleared"));
}

#[test]
fn tail_limits_log_output() {
    let env = SyncEnv::new();
    let log = SessionLog::new(env.log_file());
    for i in 0..20 {
        log.info(&format!("entry {}", i)).unwrap();
    }

    let tail = log.tail(Some(5)).unwrap();
    assert_eq!(tail.len(), 5);
    assert!(tail[4].contains("entry 19"));
}

#[test]
fn status_serializes_for_the_monitoring_surface() {
    let env = SyncEnv::new();
    env.write_log(&sync_test_utils::logs::partial_failure_log());

    let status = reporter_for(&env).status().unwrap();
    let json = serde_json::to_value(&status).unwrap();

    assert_eq!(json["state"], "completed_with_failures");
    assert_eq!(json["last_success_count"], 1);
    assert_eq!(json["last_failure_count"], 1);
}
