//! Command implementations for sync-cli

use std::path::Path;

use sync_core::SessionConfig;

use crate::error::Result;

pub mod monitor;
pub mod run;

pub use monitor::{run_clear_logs, run_logs, run_status};
pub use run::run_session;

/// Load the session configuration, falling back to defaults when no
/// config file exists (the run command then requires the remote to be
/// supplied via flags or environment).
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    if path.exists() {
        Ok(SessionConfig::load(path)?)
    } else {
        Ok(SessionConfig::default())
    }
}
