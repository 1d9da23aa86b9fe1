// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification slots: on-disk nudge deduplication.
//!
//! One JSON file per (session, slot) pair. A new send silently supersedes
//! a pending one; consumption needs an observed acknowledgement; entries
//! older than the max age count as stale and permit a resend. Writes are
//! last-writer-wins with no locking: superseding is the contract, so a
//! lost race loses nothing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gt_core::Clock;

use crate::error::MailError;

/// Persisted state of one notification slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub slot: String,
    pub session: String,
    pub message: String,
    /// Epoch milliseconds of the send.
    pub sent_at: u64,
    pub consumed: bool,
    #[serde(default)]
    pub consumed_at: Option<u64>,
}

/// The slot directory manager.
pub struct SlotStore<C> {
    dir: PathBuf,
    max_age: Duration,
    clock: C,
}

impl<C: Clock> SlotStore<C> {
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10 * 60);

    pub fn new(dir: impl Into<PathBuf>, max_age: Duration, clock: C) -> Self {
        Self { dir: dir.into(), max_age, clock }
    }

    /// True iff no unconsumed entry exists for the pair, or the pending
    /// entry is older than the max age.
    pub fn should_send(&self, session: &str, slot: &str) -> bool {
        match self.read(session, slot) {
            Some(entry) if !entry.consumed => self.is_stale(&entry),
            _ => true,
        }
    }

    /// Record a send, superseding any existing entry for the pair.
    pub fn record_send(&self, session: &str, slot: &str, message: &str) -> Result<(), MailError> {
        let entry = SlotEntry {
            slot: slot.to_string(),
            session: session.to_string(),
            message: message.to_string(),
            sent_at: self.clock.epoch_ms(),
            consumed: false,
            consumed_at: None,
        };
        self.write(session, slot, &entry)
    }

    /// Mark one slot consumed. Missing entries are fine: the agent may
    /// acknowledge after a sweep.
    pub fn mark_consumed(&self, session: &str, slot: &str) -> Result<(), MailError> {
        let Some(mut entry) = self.read(session, slot) else {
            return Ok(());
        };
        entry.consumed = true;
        entry.consumed_at = Some(self.clock.epoch_ms());
        self.write(session, slot, &entry)
    }

    /// Observed session activity consumes every pending slot for it.
    pub fn mark_session_active(&self, session: &str) -> Result<(), MailError> {
        let prefix = format!("{}--", sanitize(session));
        for (path, mut entry) in self.entries() {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.starts_with(&prefix) || entry.consumed {
                continue;
            }
            entry.consumed = true;
            entry.consumed_at = Some(self.clock.epoch_ms());
            self.write_path(&path, &entry)?;
        }
        Ok(())
    }

    /// Remove entries older than the max age. Returns how many were swept.
    pub fn sweep_stale(&self) -> usize {
        let mut swept = 0;
        for (path, entry) in self.entries() {
            if self.is_stale(&entry) {
                if std::fs::remove_file(&path).is_ok() {
                    swept += 1;
                }
            }
        }
        swept
    }

    /// Read the entry for a pair, if present and parseable.
    pub fn get(&self, session: &str, slot: &str) -> Option<SlotEntry> {
        self.read(session, slot)
    }

    fn is_stale(&self, entry: &SlotEntry) -> bool {
        let now = self.clock.epoch_ms();
        now.saturating_sub(entry.sent_at) > self.max_age.as_millis() as u64
    }

    fn path_for(&self, session: &str, slot: &str) -> PathBuf {
        self.dir.join(format!("{}--{}.json", sanitize(session), sanitize(slot)))
    }

    fn read(&self, session: &str, slot: &str) -> Option<SlotEntry> {
        let text = std::fs::read_to_string(self.path_for(session, slot)).ok()?;
        serde_json::from_str(&text).ok()
    }

    fn write(&self, session: &str, slot: &str, entry: &SlotEntry) -> Result<(), MailError> {
        self.write_path(&self.path_for(session, slot), entry)
    }

    fn write_path(&self, path: &Path, entry: &SlotEntry) -> Result<(), MailError> {
        let io_err = |source| MailError::SlotIo { path: path.display().to_string(), source };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let json = serde_json::to_string_pretty(entry)
            .map_err(|source| MailError::SlotJson { path: path.display().to_string(), source })?;
        std::fs::write(path, json).map_err(io_err)
    }

    fn entries(&self) -> Vec<(PathBuf, SlotEntry)> {
        let Ok(dir) = std::fs::read_dir(&self.dir) else {
            return vec![];
        };
        dir.flatten()
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) != Some("json") {
                    return None;
                }
                let text = std::fs::read_to_string(&path).ok()?;
                let entry = serde_json::from_str(&text).ok()?;
                Some((path, entry))
            })
            .collect()
    }
}

/// Session and slot names become filename-safe: `/` → `-`.
fn sanitize(name: &str) -> String {
    name.replace('/', "-")
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
