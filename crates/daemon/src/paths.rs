// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Town filesystem layout.

use std::path::{Path, PathBuf};

pub fn daemon_dir(town: &Path) -> PathBuf {
    town.join("daemon")
}

pub fn state_file(town: &Path) -> PathBuf {
    daemon_dir(town).join("state.json")
}

pub fn pid_file(town: &Path) -> PathBuf {
    daemon_dir(town).join("daemon.pid")
}

pub fn daemon_log(town: &Path) -> PathBuf {
    daemon_dir(town).join("daemon.log")
}

/// Lifecycle request files dropped by the CLI (and by SIGUSR1 on Unix).
pub fn request_dir(town: &Path) -> PathBuf {
    daemon_dir(town).join("requests")
}

pub fn town_log(town: &Path) -> PathBuf {
    town.join("logs/town.log")
}

pub fn event_log(town: &Path) -> PathBuf {
    town.join(".events.jsonl")
}

pub fn heartbeat_file(town: &Path) -> PathBuf {
    town.join("deacon/heartbeat.json")
}

pub fn health_state_file(town: &Path) -> PathBuf {
    town.join("deacon/health-check-state.json")
}

pub fn paused_sentinel(town: &Path) -> PathBuf {
    town.join(".runtime/deacon/paused.json")
}

pub fn notification_dir(town: &Path) -> PathBuf {
    town.join(".runtime/notifications")
}
