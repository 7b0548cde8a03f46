//! [`SyncEnv`] builder for sync-session test scenarios.
//!
//! Lays out a complete temporary deployment: a JSON route file, local
//! source directories, log and lock locations, and small shell scripts
//! standing in for the transfer tool and the reachability check.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary sync deployment with helper methods for test setup.
pub struct SyncEnv {
    temp_dir: TempDir,
}

impl Default for SyncEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEnv {
    /// Create an empty deployment directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("SyncEnv: failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("logs")).unwrap();
        Self { temp_dir }
    }

    /// Root of the temporary deployment.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn routes_file(&self) -> PathBuf {
        self.root().join("routes.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root().join("logs/sync.log")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root().join("sync.lock")
    }

    /// Create a local source directory containing one test file and
    /// return its absolute path.
    pub fn add_source(&self, name: &str) -> PathBuf {
        let dir = self.root().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("test.txt"), format!("content for {}\n", name)).unwrap();
        dir
    }

    /// Absolute path of a source that deliberately does not exist.
    pub fn missing_source(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write the route file from source/destination pairs, preserving
    /// the given order.
    pub fn write_routes(&self, routes: &[(&str, &str)]) {
        let mut map = serde_json::Map::new();
        for (source, destination) in routes {
            map.insert(
                source.to_string(),
                serde_json::Value::String(destination.to_string()),
            );
        }
        let content = serde_json::to_string_pretty(&serde_json::Value::Object(map)).unwrap();
        fs::write(self.routes_file(), content).unwrap();
    }

    /// Write arbitrary route-file content, malformed inputs included.
    pub fn write_routes_raw(&self, content: &str) {
        fs::write(self.routes_file(), content).unwrap();
    }

    /// Replace the session log with the given content.
    pub fn write_log(&self, content: &str) {
        fs::write(self.log_file(), content).unwrap();
    }

    /// Current session-log content; empty when no log exists yet.
    pub fn log_contents(&self) -> String {
        fs::read_to_string(self.log_file()).unwrap_or_default()
    }

    /// A transfer-tool stand-in that prints rsync-ish statistics and
    /// exits 0.
    pub fn fake_tool_ok(&self) -> PathBuf {
        self.script(
            "tool-ok.sh",
            "#!/bin/sh\necho 'sent 1,234 bytes  received 56 bytes'\nexit 0\n",
        )
    }

    /// A transfer-tool stand-in that always fails with `code`.
    pub fn fake_tool_fail(&self, code: i32) -> PathBuf {
        self.script(
            "tool-fail.sh",
            &format!("#!/bin/sh\necho 'rsync error: transfer failed' >&2\nexit {}\n", code),
        )
    }

    /// A transfer-tool stand-in that sleeps `secs` before succeeding,
    /// for cancellation and lock-contention tests.
    pub fn fake_tool_sleep(&self, secs: u64) -> PathBuf {
        self.script(
            "tool-sleep.sh",
            &format!("#!/bin/sh\nsleep {}\nexit 0\n", secs),
        )
    }

    /// A transfer-tool stand-in that mimics rsync's source handling: the
    /// second-to-last argument is the source; a missing source directory
    /// fails with rsync's exit code 23.
    pub fn fake_tool_check_source(&self) -> PathBuf {
        self.script(
            "tool-check-source.sh",
            concat!(
                "#!/bin/sh\n",
                "prev=''\n",
                "src=''\n",
                "for a in \"$@\"; do src=\"$prev\"; prev=\"$a\"; done\n",
                "d=\"${src%/}\"\n",
                "if [ -d \"$d\" ]; then\n",
                "  echo \"sent 1,234 bytes  received 56 bytes\"\n",
                "  exit 0\n",
                "else\n",
                "  echo \"rsync: change_dir \\\"$d\\\" failed: No such file or directory (2)\" >&2\n",
                "  exit 23\n",
                "fi\n",
            ),
        )
    }

    fn script(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, content).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }
}
