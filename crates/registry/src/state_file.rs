// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker state files.
//!
//! One JSON file per worker, co-located with its working directory
//! (`T/deacon/dogs/rex/.dog.json`). Exclusively owned by the registry;
//! authoritative for lifecycle across supervisor restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    #[default]
    Idle,
    Working,
}

/// The operationally relevant subset of a worker, mirrored from the agent
/// bead (which remains the system-wide index).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerState {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub rig: String,
    #[serde(default)]
    pub status: WorkerStatus,
    /// Bead ID of the current work assignment, if any.
    #[serde(default)]
    pub work: Option<String>,
    /// rig → worktree path.
    #[serde(default)]
    pub worktrees: BTreeMap<String, PathBuf>,
    /// rig → branch currently checked out in that worktree.
    #[serde(default)]
    pub branches: BTreeMap<String, String>,
    /// Epoch milliseconds.
    pub created_at: u64,
    /// Bumped on every mutation.
    pub last_active: u64,
}

impl WorkerState {
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::StateIo {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RegistryError::StateJson {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load if present; `Ok(None)` when the file does not exist.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>, RegistryError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let io_err = |source| RegistryError::StateIo {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            RegistryError::StateJson { path: path.display().to_string(), source }
        })?;
        std::fs::write(path, json).map_err(io_err)
    }
}

#[cfg(test)]
#[path = "state_file_tests.rs"]
mod tests;
