//! Sync orchestration engine for Routesync
//!
//! This crate drives one scheduled sync session end to end:
//!
//! - **RouteTable**: ordered source/destination pairs from the JSON route file
//! - **SessionLock**: process-wide advisory lock, one session at a time
//! - **ConnectivityProbe**: bounded fixed-interval reachability check
//! - **TransferRunner**: one transfer-tool subprocess per route
//! - **SessionLog**: append-only structured log, the durable session record
//! - **StatusReporter**: status view derived from the log and the lock
//!
//! # Architecture
//!
//! `sync-core` sits between the filesystem layer and the CLI:
//!
//! ```text
//!        CLI (run / status / logs / clear-logs)
//!                        |
//!                    sync-core
//!                        |
//!                    sync-fs
//! ```
//!
//! Route failures are isolated: every route in the table is attempted in
//! order regardless of earlier outcomes, and each produces exactly one
//! [`RouteResult`]. Configuration, lock, connectivity, and signal
//! problems abort the whole session instead.

pub mod cancel;
pub mod config;
pub mod error;
pub mod lock;
pub mod log;
pub mod orchestrator;
pub mod probe;
pub mod retry;
pub mod routes;
pub mod status;
pub mod transfer;

pub use cancel::CancelToken;
pub use config::{ProbeSettings, RemoteEndpoint, SessionConfig, TransferOptions};
pub use error::{Error, Result};
pub use lock::{LockGuard, SessionLock};
pub use log::{LogLevel, SessionLog};
pub use orchestrator::{SessionOutcome, SessionReport, SyncOrchestrator};
pub use probe::{CommandSpec, ConnectivityProbe};
pub use retry::{RetryPolicy, retry_bounded};
pub use routes::{RouteEntry, RouteTable, ValidatedRoute};
pub use status::{StatusReporter, SyncState, SyncStatus};
pub use transfer::{FailureReason, RouteOutcome, RouteResult, TransferRunner};
