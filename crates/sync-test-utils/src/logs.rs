//! Canned session-log content for status-derivation tests.

/// A session that completed with one failed route.
pub fn partial_failure_log() -> String {
    [
        "[2024-01-01 10:00:00] [INFO] Starting sync process...",
        "[2024-01-01 10:00:01] [INFO] Processing 2 backup route(s)",
        "[2024-01-01 10:00:02] [INFO] Testing SSH connection to user@192.168.1.100",
        "[2024-01-01 10:00:03] [INFO] SSH connection successful",
        "[2024-01-01 10:00:04] [INFO] Starting sync: /data/test1 -> /remote/backup1",
        "[2024-01-01 10:00:10] [SUCCESS] Sync completed: /data/test1 -> /remote/backup1 (6s)",
        "[2024-01-01 10:00:11] [INFO] Starting sync: /data/test2 -> /remote/backup2",
        "[2024-01-01 10:00:15] [ERROR] Sync failed: /data/test2 -> /remote/backup2 (exit code: 1, duration: 4s)",
        "[2024-01-01 10:00:16] [INFO] Sync process completed - Success: 1, Failures: 1, Total Duration: 16s",
        "[2024-01-01 10:00:17] [WARN] Some syncs failed. Check logs for details.",
    ]
    .join("\n")
}

/// A session where every route succeeded.
pub fn completed_log() -> String {
    [
        "[2024-01-01 10:00:00] [INFO] Starting sync process...",
        "[2024-01-01 10:00:01] [INFO] Processing 2 backup route(s)",
        "[2024-01-01 10:00:02] [INFO] Testing SSH connection to user@192.168.1.100",
        "[2024-01-01 10:00:03] [INFO] SSH connection successful",
        "[2024-01-01 10:00:04] [INFO] Starting sync: /data/test1 -> /remote/backup1",
        "[2024-01-01 10:00:10] [SUCCESS] Sync completed: /data/test1 -> /remote/backup1 (6s)",
        "[2024-01-01 10:00:11] [INFO] Starting sync: /data/test2 -> /remote/backup2",
        "[2024-01-01 10:00:15] [SUCCESS] Sync completed: /data/test2 -> /remote/backup2 (4s)",
        "[2024-01-01 10:00:16] [INFO] Sync process completed - Success: 2, Failures: 0, Total Duration: 16s",
        "[2024-01-01 10:00:17] [SUCCESS] All syncs completed successfully",
    ]
    .join("\n")
}

/// A session that aborted because the remote never became reachable.
pub fn aborted_log() -> String {
    [
        "[2024-01-01 10:00:00] [INFO] Starting sync process...",
        "[2024-01-01 10:00:01] [INFO] Processing 2 backup route(s)",
        "[2024-01-01 10:00:02] [INFO] Testing SSH connection to user@192.168.1.100",
        "[2024-01-01 10:05:02] [ERROR] SSH connection failed after 10 attempts",
        "[2024-01-01 10:05:02] [ERROR] Sync aborted: remote host unreachable",
    ]
    .join("\n")
}

/// A session still in flight: started, no verdict yet.
pub fn running_log() -> String {
    [
        "[2024-01-01 10:00:00] [INFO] Starting sync process...",
        "[2024-01-01 10:00:01] [INFO] Processing 3 backup route(s)",
        "[2024-01-01 10:00:02] [INFO] Testing SSH connection to user@192.168.1.100",
        "[2024-01-01 10:00:03] [INFO] SSH connection successful",
        "[2024-01-01 10:00:04] [INFO] Starting sync: /data1 -> /remote/backup/data1",
    ]
    .join("\n")
}

/// A log holding only the cleared marker.
pub fn cleared_log() -> String {
    "[2024-01-01 10:00:00] [INFO] Logs cleared".to_string()
}
