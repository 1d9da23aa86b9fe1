// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patrol scheduling.
//!
//! Each named patrol ticks on its own interval, can be disabled in
//! `mayor/daemon.json`, and is skipped wholesale while the deacon pause
//! sentinel exists. A patrol body that fails logs and waits for its next
//! tick; nothing a patrol does may halt the supervisor.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use gt_core::config::DaemonConfig;

use crate::error::DaemonError;
use crate::paths;

/// Patrol names wired into the daemon.
pub mod names {
    pub const WITNESS: &str = "witness";
    pub const REFINERY: &str = "refinery";
    pub const DEACON: &str = "deacon";
    pub const RETENTION: &str = "retention";
    pub const STALE_HOOKS: &str = "stale_hooks";
}

/// Liveness record written after every patrol pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatFile {
    #[serde(default)]
    pub cycles: BTreeMap<String, u64>,
    /// Patrol name → RFC 3339 of its last completed pass.
    #[serde(default)]
    pub last_run: BTreeMap<String, String>,
}

impl HeartbeatFile {
    pub fn load(town: &Path) -> Self {
        std::fs::read_to_string(paths::heartbeat_file(town))
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn save(&self, town: &Path) {
        let path = paths::heartbeat_file(town);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let json = serde_json::to_string_pretty(self).unwrap_or_default();
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!(path = %path.display(), error = %e, "heartbeat write failed");
        }
    }
}

/// Record one completed pass. Best-effort.
pub fn record_patrol_run(town: &Path, name: &str) {
    let mut heartbeat = HeartbeatFile::load(town);
    *heartbeat.cycles.entry(name.to_string()).or_default() += 1;
    heartbeat.last_run.insert(name.to_string(), chrono::Utc::now().to_rfc3339());
    heartbeat.save(town);
}

/// Should this patrol run right now?
pub fn patrol_runnable(town: &Path, config: &DaemonConfig, name: &str) -> bool {
    if paths::paused_sentinel(town).exists() {
        return false;
    }
    config.patrol_enabled(name)
}

/// Drive one patrol until cancellation.
pub async fn run_patrol_loop<F, Fut>(
    name: &'static str,
    interval: Duration,
    town: &Path,
    config: &DaemonConfig,
    cancel: CancellationToken,
    mut body: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), DaemonError>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first interval tick fires immediately; skip it so patrols start
    // one interval after boot.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if !patrol_runnable(town, config, name) {
            tracing::debug!(patrol = name, "patrol skipped");
            continue;
        }
        if let Err(e) = body().await {
            tracing::warn!(patrol = name, error = %e, "patrol failed; continuing");
        }
        record_patrol_run(town, name);
    }
}

#[cfg(test)]
#[path = "patrol_tests.rs"]
mod tests;
