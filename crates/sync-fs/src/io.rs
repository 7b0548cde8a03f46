//! Locked file operations for the append-only session log
//!
//! The session lock already guarantees a single writer per session; the
//! fs2 locks here only serialize log appends against a concurrent
//! `clear`/truncate from the monitoring surface.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Append one line to `path`, creating the file (and parent directory) if
/// needed. The line is written with a trailing newline under an exclusive
/// lock.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = open_append(path)?;

    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let result = writeln!(file, "{}", line).map_err(|e| Error::io(path, e));

    // Release before propagating any write failure
    FileExt::unlock(&file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    result
}

/// Open `path` for appending, creating parents as needed.
///
/// The returned handle is suitable for handing to a subprocess so its
/// output streams into the file as it is produced.
pub fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| Error::io(path, e))
}

/// Read the last `max_lines` lines of `path` (all lines when `None`).
///
/// A missing file reads as empty: the log simply has not been written yet.
pub fn read_tail(path: &Path, max_lines: Option<usize>) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    match max_lines {
        Some(n) if lines.len() > n => Ok(lines[lines.len() - n..].to_vec()),
        _ => Ok(lines),
    }
}

/// Truncate `path` and write `line` as its only content, under an
/// exclusive lock so an in-flight append cannot interleave.
pub fn truncate_with(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let result = writeln!(file, "{}", line).map_err(|e| Error::io(path, e));

    FileExt::unlock(&file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    result
}
