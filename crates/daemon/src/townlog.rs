// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The human-readable town log.
//!
//! `logs/town.log` gets one line per lifecycle event an operator might
//! grep for (spawns, kills, force-kills, convoy closes). Structured
//! telemetry goes to tracing; this file is for humans.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

#[derive(Debug, Clone)]
pub struct TownLog {
    path: PathBuf,
}

impl TownLog {
    pub fn new(town: &Path) -> Self {
        Self { path: crate::paths::town_log(town) }
    }

    /// Append one audit line. Best-effort: a failed append warns and moves
    /// on, it never fails the operation being audited.
    pub fn append(&self, category: &str, message: &str) {
        let line = format!(
            "{} [{category}] {message}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Err(e) = self.append_inner(&line) {
            tracing::warn!(path = %self.path.display(), error = %e, "town log append failed");
        }
    }

    fn append_inner(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}
