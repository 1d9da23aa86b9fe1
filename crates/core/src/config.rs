// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed views of the town's configuration files.
//!
//! `mayor/town.json` names the town, `mayor/rigs.json` catalogs rigs and
//! their store prefixes, `mayor/daemon.json` holds per-patrol enable flags.
//! Loading is thin serde_json over the filesystem; richer config tooling is
//! out of scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// `mayor/town.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownConfig {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One entry in `mayor/rigs.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigEntry {
    pub git_url: String,
    pub prefix: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// `mayor/rigs.json`: rig name → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigsConfig {
    #[serde(default)]
    pub rigs: BTreeMap<String, RigEntry>,
}

impl RigsConfig {
    pub fn rig_names(&self) -> Vec<String> {
        self.rigs.keys().cloned().collect()
    }

    pub fn prefix_for(&self, rig: &str) -> Option<&str> {
        self.rigs.get(rig).map(|e| e.prefix.as_str())
    }
}

/// `mayor/daemon.json`: patrol enablement and tick tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Patrol name → enabled. Absent patrols default to enabled.
    #[serde(default)]
    pub patrols: BTreeMap<String, bool>,
    #[serde(default)]
    pub heartbeat_interval_secs: Option<u64>,
}

impl DaemonConfig {
    pub fn patrol_enabled(&self, name: &str) -> bool {
        self.patrols.get(name).copied().unwrap_or(true)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

impl TownConfig {
    pub fn load(town_root: &Path) -> Result<Self, ConfigError> {
        load_json(&town_root.join("mayor/town.json"))
    }
}

impl RigsConfig {
    pub fn load(town_root: &Path) -> Result<Self, ConfigError> {
        load_json(&town_root.join("mayor/rigs.json"))
    }
}

impl DaemonConfig {
    /// Missing file means all patrols enabled at default intervals.
    pub fn load(town_root: &Path) -> Result<Self, ConfigError> {
        let path = town_root.join("mayor/daemon.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        load_json(&path)
    }
}

/// Enablement gate: `GASTOWN_DISABLED` wins over `GASTOWN_ENABLED`; with
/// neither set the supervisor is enabled.
pub fn enabled_from_env(disabled: Option<&str>, enabled: Option<&str>) -> bool {
    if disabled.is_some_and(|v| !v.is_empty() && v != "0") {
        return false;
    }
    if let Some(v) = enabled {
        return !v.is_empty() && v != "0";
    }
    true
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
