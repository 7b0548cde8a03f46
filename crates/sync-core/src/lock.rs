//! Process-wide session lock
//!
//! An exclusive advisory flock on a fixed, well-known marker path keeps
//! overlapping scheduler invocations from running two sessions at once.
//! The lock is scoped: [`LockGuard`] releases on drop, so every exit path
//! of the orchestrator gives the lock back, unwinding after a signal
//! included.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// How often a blocked `acquire` re-checks the lock.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Exclusive advisory lock keyed by a fixed marker-file path.
#[derive(Debug, Clone)]
pub struct SessionLock {
    path: PathBuf,
}

impl SessionLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block up to `timeout` for the lock.
    ///
    /// The first attempt is made immediately, so a zero timeout gives
    /// try-lock semantics. The holder PID is written into the marker file
    /// for operators inspecting a stuck deployment.
    ///
    /// # Errors
    ///
    /// `Error::LockTimeout` when another session still holds the lock at
    /// the deadline.
    pub fn acquire(&self, timeout: Duration) -> Result<LockGuard> {
        let file = self.open()?;
        let start = Instant::now();

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockTimeout {
                            path: self.path.clone(),
                            waited: start.elapsed(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL.min(timeout));
                }
                Err(e) => return Err(sync_fs::Error::io(&self.path, e).into()),
            }
        }

        tracing::debug!(path = %self.path.display(), "session lock acquired");

        let mut guard = LockGuard { file };
        guard.record_holder()?;
        Ok(guard)
    }

    /// Observe whether some session currently holds the lock, without
    /// taking it.
    pub fn is_held(&self) -> bool {
        let Ok(file) = self.open() else {
            return false;
        };
        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = FileExt::unlock(&file);
                false
            }
            Err(_) => true,
        }
    }

    fn open(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| sync_fs::Error::io(&self.path, e).into())
    }
}

/// Held session lock. Dropping the guard releases the lock.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

impl LockGuard {
    fn record_holder(&mut self) -> Result<()> {
        self.file.set_len(0).map_err(Error::Io)?;
        self.file.seek(SeekFrom::Start(0)).map_err(Error::Io)?;
        writeln!(self.file, "{}", std::process::id()).map_err(Error::Io)?;
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        tracing::debug!("session lock released");
    }
}
