//! End-to-end session tests
//!
//! Each test stands up a full temporary deployment (route file, sources,
//! log, lock) and drives real sessions with fake transfer tools.

#![cfg(unix)]

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use sync_core::{
    CancelToken, Error, ProbeSettings, RemoteEndpoint, SessionConfig, SessionLock,
    SessionOutcome, SyncOrchestrator, TransferOptions,
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
            args: vec!["-avzP".to_string()],
            excludes: vec![],
        },
    }
}

#[test]
fn partial_failure_when_one_source_is_missing() {
    let env = SyncEnv::new();
    let existing = env.add_source("data-a");
    let missing = env.missing_source("data-b");
    env.write_routes(&[
        (&existing.to_string_lossy(), "/backup/a"),
        (&missing.to_string_lossy(), "/backup/b"),
    ]);

    let config = config_for(&env, &env.fake_tool_check_source().to_string_lossy());
    let report = SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::PartialFailure);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.failure_count, 1);
    assert_eq!(report.route_results.len(), 2);
    assert!(report.route_results[0].succeeded());
    assert!(!report.route_results[1].succeeded());

    let log = env.log_contents();
    assert!(log.contains("Sync process completed - Success: 1, Failures: 1"));
    assert!(log.contains("Some syncs failed. Check logs for details."));
    // rsync-style tool stderr streamed into the log
    assert!(log.contains("change_dir"));
}

#[test]
fn a_failed_route_does_not_stop_later_routes() {
    let env = SyncEnv::new();
    let first = env.missing_source("gone-first");
    let second = env.add_source("data-second");
    let third = env.add_source("data-third");
    env.write_routes(&[
        (&first.to_string_lossy(), "/backup/first"),
        (&second.to_string_lossy(), "/backup/second"),
        (&third.to_string_lossy(), "/backup/third"),
    ]);

    let config = config_for(&env, &env.fake_tool_check_source().to_string_lossy());
    let report = SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap();

    assert_eq!(report.route_results.len(), 3);
    assert!(!report.route_results[0].succeeded());
    assert!(report.route_results[1].succeeded());
    assert!(report.route_results[2].succeeded());

    // processing order matches declaration order
    let sources: Vec<_> = report
        .route_results
        .iter()
        .map(|r| r.route.source.as_str())
        .collect();
    assert_eq!(
        sources,
        vec![
            first.to_string_lossy().as_ref(),
            second.to_string_lossy().as_ref(),
            third.to_string_lossy().as_ref()
        ]
    );
}

#[test]
fn malformed_route_file_never_takes_the_lock() {
    let env = SyncEnv::new();
    env.write_routes_raw(r#"{"unclosed": "string""#);

    let config = config_for(&env, "unused");
    let err = SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert!(!env.lock_file().exists());
    assert!(!env.log_contents().contains("Starting sync:"));
}

#[test]
fn empty_route_file_is_a_config_error() {
    let env = SyncEnv::new();
    env.write_routes_raw("{}");

    let config = config_for(&env, "unused");
    let err = SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn probe_exhaustion_attempts_zero_routes() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);

    let mut config = config_for(&env, &env.fake_tool_ok().to_string_lossy());
    config.probe = ProbeSettings {
        max_attempts: 10,
        interval_secs: 0,
        command: Some(vec!["false".to_string()]),
        ..ProbeSettings::default()
    };

    let err = SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Connectivity { attempts: 10, .. }
    ));
    let log = env.log_contents();
    assert!(log.contains("SSH connection failed after 10 attempts"));
    assert!(!log.contains("Starting sync:"));
    // lock was taken for the probe, and released on abort
    assert!(!SessionLock::new(env.lock_file()).is_held());
}

#[test]
fn concurrent_invocations_run_exactly_one_session() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);

    // the winner holds the lock for ~1s, long enough for the loser to
    // observe contention
    let tool = env.fake_tool_sleep(1).to_string_lossy().to_string();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let config = config_for(&env, &tool);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let orchestrator = SyncOrchestrator::new(config);
                barrier.wait();
                orchestrator.run(&CancelToken::new())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let completed: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    let locked_out: Vec<_> = results
        .iter()
        .filter(|r| matches!(r, Err(Error::LockTimeout { .. })))
        .collect();

    assert_eq!(completed.len(), 1, "exactly one session must complete");
    assert_eq!(locked_out.len(), 1, "the other must observe the lock");

    // the locked-out session attempted zero routes: only the winner's
    // route line is in the log
    let log = env.log_contents();
    assert_eq!(log.matches("Starting sync:").count(), 1);
}

#[test]
fn cancellation_mid_transfer_kills_the_child_and_releases_the_lock() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);

    let config = config_for(&env, &env.fake_tool_sleep(30).to_string_lossy());
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let handle = thread::spawn(move || SyncOrchestrator::new(config).run(&worker_cancel));

    // let the session reach the transfer, then interrupt it
    thread::sleep(Duration::from_millis(600));
    cancel.cancel();

    let err = handle.join().unwrap().unwrap_err();
    assert!(matches!(err, Error::Interrupted));

    let log = env.log_contents();
    assert!(log.contains("Sync interrupted by signal"));
    assert!(log.contains("Sync aborted"));
    assert!(!SessionLock::new(env.lock_file()).is_held());
}

#[test]
fn all_successful_routes_finalize_as_all_succeeded() {
    let env = SyncEnv::new();
    let a = env.add_source("data-a");
    let b = env.add_source("data-b");
    env.write_routes(&[
        (&a.to_string_lossy(), "/backup/a"),
        (&b.to_string_lossy(), "/backup/b"),
    ]);

    let config = config_for(&env, &env.fake_tool_ok().to_string_lossy());
    let report = SyncOrchestrator::new(config)
        .run(&CancelToken::new())
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::AllSucceeded);
    assert_eq!(report.success_count, 2);
    assert_eq!(report.failure_count, 0);

    let log = env.log_contents();
    assert!(log.contains("SSH connection successful"));
    assert!(log.contains("Sync process completed - Success: 2, Failures: 0"));
    assert!(log.contains("All syncs completed successfully"));
}
