//! Session configuration
//!
//! One [`SessionConfig`] value carries everything a session needs: the
//! remote endpoint, file locations, probe and lock budgets, and transfer
//! tool options. It is passed to the orchestrator at construction; nothing
//! reads the process environment from inside the engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::retry::RetryPolicy;

/// The remote endpoint a session syncs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
    /// Account on the remote host
    pub user: String,
    /// Hostname or tunnel address of the remote
    pub host: String,
    /// Private key presented to the remote
    #[serde(default = "default_ssh_key")]
    pub ssh_key: PathBuf,
    /// Per-connection timeout, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl RemoteEndpoint {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            ssh_key: default_ssh_key(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// `user@host` form used on the transfer command line.
    pub fn target(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// SSH option vector shared by the connectivity check and the
    /// transfer tool's remote shell. Non-interactive by construction:
    /// BatchMode refuses password prompts outright.
    pub fn ssh_args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.ssh_key.display().to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
            "-o".to_string(),
            "ServerAliveInterval=60".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
        ]
    }

    /// The `-e` argument handed to the transfer tool. A single argv
    /// element; the tool itself splits it, no shell is involved.
    pub fn remote_shell(&self) -> String {
        let mut shell = String::from("ssh");
        for arg in self.ssh_args() {
            shell.push(' ');
            shell.push_str(&arg);
        }
        shell
    }
}

/// Bounds for the pre-session reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Attempts before the session is aborted
    #[serde(default = "default_probe_attempts")]
    pub max_attempts: u32,
    /// Hard ceiling for one check, in seconds; a hung check is killed
    #[serde(default = "default_probe_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// Fixed sleep between failed attempts, in seconds
    #[serde(default = "default_probe_interval")]
    pub interval_secs: u64,
    /// Override for the reachability check command (program followed by
    /// arguments). When unset, the standard SSH check is used.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

impl ProbeSettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            interval: Duration::from_secs(self.interval_secs),
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_probe_attempts(),
            attempt_timeout_secs: default_probe_attempt_timeout(),
            interval_secs: default_probe_interval(),
            command: None,
        }
    }
}

/// Transfer tool invocation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOptions {
    /// Transfer tool binary
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Tool flags preceding the route arguments
    #[serde(default = "default_tool_args")]
    pub args: Vec<String>,
    /// Patterns excluded from every route
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            args: default_tool_args(),
            excludes: default_excludes(),
        }
    }
}

/// Complete configuration for one sync session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub remote: RemoteEndpoint,
    /// JSON route table location
    #[serde(default = "default_routes_file")]
    pub routes_file: PathBuf,
    /// Append-only session log location
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Well-known lock marker path; one per deployment
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
    #[serde(default)]
    pub probe: ProbeSettings,
    /// How long `run` waits for a session already in flight
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_secs: u64,
    #[serde(default)]
    pub transfer: TransferOptions,
}

impl SessionConfig {
    /// Load a session configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| sync_fs::Error::io(path, e))?;
        let config: SessionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            remote: RemoteEndpoint::new("", ""),
            routes_file: default_routes_file(),
            log_file: default_log_file(),
            lock_file: default_lock_file(),
            probe: ProbeSettings::default(),
            lock_timeout_secs: default_lock_timeout(),
            transfer: TransferOptions::default(),
        }
    }
}

fn default_ssh_key() -> PathBuf {
    PathBuf::from("/.ssh/id_rsa")
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_probe_attempts() -> u32 {
    10
}

fn default_probe_attempt_timeout() -> u64 {
    15
}

fn default_probe_interval() -> u64 {
    30
}

fn default_tool() -> String {
    "rsync".to_string()
}

fn default_tool_args() -> Vec<String> {
    vec![
        "-avzP".to_string(),
        "--stats".to_string(),
        "--timeout=3600".to_string(),
    ]
}

fn default_excludes() -> Vec<String> {
    [
        "*.Trash*",
        "lost+found",
        "System Volume Information",
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        "sync.log",
        ".venv",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_routes_file() -> PathBuf {
    PathBuf::from("/config/routes.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("/config/logs/sync.log")
}

fn default_lock_file() -> PathBuf {
    PathBuf::from("/tmp/routesync.lock")
}

fn default_lock_timeout() -> u64 {
    300
}
