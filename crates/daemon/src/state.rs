// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon state and pid files.
//!
//! `daemon/state.json` is for observers (the CLI, other tools);
//! `daemon/daemon.pid` is for foreign readers and doubles as the
//! single-daemon lock via an exclusive flock held for the process
//! lifetime.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;
use crate::paths;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonState {
    pub running: bool,
    pub pid: u32,
    #[serde(default)]
    pub started_at: Option<String>,
    /// Epoch milliseconds of the last heartbeat tick.
    #[serde(default)]
    pub last_heartbeat: u64,
    #[serde(default)]
    pub heartbeat_count: u64,
}

impl DaemonState {
    pub fn load(town: &Path) -> Result<Option<Self>, DaemonError> {
        let path = paths::state_file(town);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DaemonError::Io { path: path.display().to_string(), source })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| DaemonError::Json { path: path.display().to_string(), source })
    }

    pub fn save(&self, town: &Path) -> Result<(), DaemonError> {
        let path = paths::state_file(town);
        let io_err =
            |source| DaemonError::Io { path: path.display().to_string(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| DaemonError::Json { path: path.display().to_string(), source })?;
        std::fs::write(&path, json).map_err(io_err)
    }
}

/// The pid file, exclusively locked while the daemon lives. Dropping the
/// handle releases the lock; the file itself is removed on clean shutdown.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    _file: File,
}

impl PidFile {
    /// Acquire the lock and write our pid. Fails when another daemon
    /// already holds it.
    pub fn acquire(town: &Path, pid: u32) -> Result<PidFile, DaemonError> {
        let path = paths::pid_file(town);
        let io_err =
            |source| DaemonError::Io { path: path.display().to_string(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err)?;
        if file.try_lock_exclusive().is_err() {
            return Err(DaemonError::PidLocked(path.display().to_string()));
        }
        file.set_len(0).map_err(io_err)?;
        writeln!(file, "{pid}").map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(PidFile { path, _file: file })
    }

    /// Read the pid another process recorded, if any.
    pub fn read(town: &Path) -> Option<u32> {
        let text = std::fs::read_to_string(paths::pid_file(town)).ok()?;
        text.trim().parse().ok()
    }

    pub fn remove(self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove pid file");
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
