//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Routesync - Scheduled multi-route file synchronization over a private tunnel
#[derive(Parser, Debug)]
#[command(name = "routesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "ROUTESYNC_CONFIG",
        default_value = "/config/routesync.toml"
    )]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start a sync session
    ///
    /// Loads the route table, takes the session lock, verifies the remote
    /// is reachable, and syncs every route in declaration order.
    Run {
        /// Return immediately when another session is already running,
        /// instead of waiting out the lock timeout
        #[arg(long)]
        if_idle: bool,

        /// Remote account (overrides the config file)
        #[arg(long, env = "REMOTE_USER")]
        remote_user: Option<String>,

        /// Remote host (overrides the config file)
        #[arg(long, env = "REMOTE_HOST")]
        remote_host: Option<String>,

        /// Route table location (overrides the config file)
        #[arg(long, env = "ROUTES_FILE")]
        routes_file: Option<PathBuf>,

        /// SSH private key (overrides the config file)
        #[arg(long, env = "SSH_KEY_FILE")]
        ssh_key: Option<PathBuf>,
    },

    /// Show the derived sync status
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the session log
    Logs {
        /// Only the last N lines
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Truncate the session log
    ClearLogs,
}
