//! Routesync CLI
//!
//! The command-line interface for the sync orchestration engine: start a
//! session, inspect the derived status, read or clear the session log.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::run::RunOverrides;
use error::Result;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let config = commands::load_config(&cli.config)?;

    match cli.command {
        Some(cmd) => execute_command(cmd, config),
        None => {
            println!("{} Routesync CLI", "routesync".green().bold());
            println!();
            println!("Run {} for available commands.", "routesync --help".cyan());
            Ok(0)
        }
    }
}

fn execute_command(cmd: Commands, config: sync_core::SessionConfig) -> Result<i32> {
    match cmd {
        Commands::Run {
            if_idle,
            remote_user,
            remote_host,
            routes_file,
            ssh_key,
        } => commands::run_session(
            config,
            RunOverrides {
                remote_user,
                remote_host,
                routes_file,
                ssh_key,
            },
            if_idle,
        ),
        Commands::Status { json } => commands::run_status(&config, json),
        Commands::Logs { tail } => commands::run_logs(&config, tail),
        Commands::ClearLogs => commands::run_clear_logs(&config),
    }
}
