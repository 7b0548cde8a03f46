//! CLI tests for the routesync binary

#![cfg(unix)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use sync_test_utils::SyncEnv;

/// Write a session config TOML wired into the temp deployment.
fn write_config(env: &SyncEnv, tool: &str) -> std::path::PathBuf {
    let path = env.root().join("routesync.toml");
    let content = format!(
        r#"
routes_file = "{routes}"
log_file = "{log}"
lock_file = "{lock}"
lock_timeout_secs = 0

[remote]
user = "backup"
host = "nas.test"

[probe]
max_attempts = 1
interval_secs = 0
command = ["true"]

[transfer]
tool = "{tool}"
args = []
excludes = []
"#,
        routes = env.routes_file().display(),
        log = env.log_file().display(),
        lock = env.lock_file().display(),
        tool = tool,
    );
    fs::write(&path, content).unwrap();
    path
}

fn routesync() -> Command {
    Command::cargo_bin("routesync").unwrap()
}

#[test]
fn status_on_fresh_deployment_is_idle() {
    let env = SyncEnv::new();
    let config = write_config(&env, "unused");

    routesync()
        .args(["--config", &config.to_string_lossy(), "status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"state\": \"idle\""));
}

#[test]
fn run_syncs_routes_and_exits_zero() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);
    let config = write_config(&env, &env.fake_tool_ok().to_string_lossy());

    routesync()
        .args(["--config", &config.to_string_lossy(), "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 1 route(s)"));

    routesync()
        .args(["--config", &config.to_string_lossy(), "status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"state\": \"completed_ok\""));
}

#[test]
fn run_with_a_failing_route_exits_nonzero() {
    let env = SyncEnv::new();
    let good = env.add_source("data-a");
    let gone = env.missing_source("data-b");
    env.write_routes(&[
        (&good.to_string_lossy(), "/backup/a"),
        (&gone.to_string_lossy(), "/backup/b"),
    ]);
    let config = write_config(&env, &env.fake_tool_check_source().to_string_lossy());

    routesync()
        .args(["--config", &config.to_string_lossy(), "run"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 of 2 route(s) failed"));
}

#[test]
fn run_without_remote_configuration_fails_with_a_hint() {
    let env = SyncEnv::new();

    routesync()
        .env_remove("REMOTE_USER")
        .env_remove("REMOTE_HOST")
        .args([
            "--config",
            &env.root().join("missing.toml").to_string_lossy(),
            "run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("REMOTE_USER"));
}

#[test]
fn logs_and_clear_logs_round_trip() {
    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);
    let config = write_config(&env, &env.fake_tool_ok().to_string_lossy());
    let config_arg = config.to_string_lossy().to_string();

    routesync()
        .args(["--config", &config_arg, "run"])
        .assert()
        .success();

    routesync()
        .args(["--config", &config_arg, "logs", "--tail", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All syncs completed successfully"));

    routesync()
        .args(["--config", &config_arg, "clear-logs"])
        .assert()
        .success();

    routesync()
        .args(["--config", &config_arg, "logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logs cleared"));

    routesync()
        .args(["--config", &config_arg, "status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"state\": \"idle\""));
}

#[test]
fn run_if_idle_skips_when_another_session_holds_the_lock() {
    use std::time::Duration;
    use sync_core::SessionLock;

    let env = SyncEnv::new();
    let source = env.add_source("data-a");
    env.write_routes(&[(&source.to_string_lossy(), "/backup/a")]);
    let config = write_config(&env, &env.fake_tool_ok().to_string_lossy());

    let lock = SessionLock::new(env.lock_file());
    let _guard = lock.acquire(Duration::ZERO).unwrap();

    routesync()
        .args(["--config", &config.to_string_lossy(), "run", "--if-idle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already running"));
}
