// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stuck-agent detection (the deacon patrol).
//!
//! Each monitored session gets a HEALTH_CHECK nudge through the
//! notification-slot manager. An agent that consumes the slot within the
//! ping timeout resets its failure counter; one that misses
//! `consecutive_failures` nudges in a row is force-killed, once, and then
//! left alone for the kill cooldown.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gt_core::roledef::HealthThresholds;
use gt_core::Clock;
use gt_mail::SlotStore;
use gt_session::backend::SessionBackend;

use crate::error::DaemonError;
use crate::townlog::TownLog;

/// Slot name used for health nudges.
pub const HEALTH_SLOT: &str = "health";

/// Text typed into a session to prompt an activity update.
pub const HEALTH_CHECK_NUDGE: &str = "HEALTH_CHECK: reply or touch your activity slot";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHealth {
    #[serde(default)]
    pub failures: u32,
    /// Epoch ms of the pending nudge, if one is outstanding.
    #[serde(default)]
    pub nudge_sent_at: Option<u64>,
    /// Epoch ms of the last force-kill (starts the cooldown window).
    #[serde(default)]
    pub last_kill_at: Option<u64>,
}

/// Persisted across daemon restarts in `deacon/health-check-state.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthCheckState {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentHealth>,
}

impl HealthCheckState {
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<(), DaemonError> {
        let io_err = |source| DaemonError::Io { path: path.display().to_string(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| DaemonError::Json { path: path.display().to_string(), source })?;
        std::fs::write(path, json).map_err(io_err)
    }
}

/// What one tick decided for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session gone; tracking dropped.
    Gone,
    /// Inside the kill cooldown; left alone.
    Cooldown,
    /// Answered the last nudge; counter reset, new nudge sent.
    Responsive,
    /// Missed the last nudge; counter now at the given value.
    Missed(u32),
    /// Counter reached the threshold; session force-killed.
    Killed,
    /// First contact; nudge sent.
    Nudged,
}

pub struct StuckDetector<B, C> {
    sessions: B,
    slots: SlotStore<C>,
    clock: C,
    thresholds: HealthThresholds,
    state_path: PathBuf,
    townlog: TownLog,
}

impl<B: SessionBackend, C: Clock> StuckDetector<B, C> {
    /// The slot store's max age is pinned to the ping timeout: a pending
    /// nudge goes stale exactly when its answer window closes, which is
    /// what re-arms the next send.
    pub fn new(
        sessions: B,
        slot_dir: PathBuf,
        clock: C,
        thresholds: HealthThresholds,
        state_path: PathBuf,
        townlog: TownLog,
    ) -> Self {
        let slots = SlotStore::new(
            slot_dir,
            std::time::Duration::from_secs(thresholds.ping_timeout_secs),
            clock.clone(),
        );
        Self { sessions, slots, clock, thresholds, state_path, townlog }
    }

    /// The slot store agents acknowledge through.
    pub fn slots(&self) -> &SlotStore<C> {
        &self.slots
    }

    /// Run one detection pass over the monitored sessions.
    pub async fn tick(
        &self,
        monitored: &[String],
    ) -> Result<BTreeMap<String, TickOutcome>, DaemonError> {
        let mut state = HealthCheckState::load(&self.state_path);
        let mut outcomes = BTreeMap::new();

        for session in monitored {
            let outcome = self.check_session(session, &mut state).await?;
            outcomes.insert(session.clone(), outcome);
        }

        // Forget sessions nobody monitors any more
        state.agents.retain(|session, _| monitored.contains(session));
        state.save(&self.state_path)?;
        Ok(outcomes)
    }

    async fn check_session(
        &self,
        session: &str,
        state: &mut HealthCheckState,
    ) -> Result<TickOutcome, DaemonError> {
        let now = self.clock.epoch_ms();

        if !self.sessions.exists(session).await? {
            state.agents.remove(session);
            return Ok(TickOutcome::Gone);
        }

        let health = state.agents.entry(session.to_string()).or_default();

        if let Some(killed_at) = health.last_kill_at {
            if now.saturating_sub(killed_at) < self.thresholds.kill_cooldown_secs * 1000 {
                return Ok(TickOutcome::Cooldown);
            }
            health.last_kill_at = None;
        }

        // Evaluate the outstanding probe once its answer window elapsed
        if let Some(sent_at) = health.nudge_sent_at {
            if now.saturating_sub(sent_at) < self.thresholds.ping_timeout_secs * 1000 {
                // Window still open; do not stack nudges
                return Ok(TickOutcome::Nudged);
            }
            let answered = self
                .slots
                .get(session, HEALTH_SLOT)
                .map(|entry| entry.consumed)
                .unwrap_or(false);
            let outcome = if answered {
                health.failures = 0;
                TickOutcome::Responsive
            } else {
                health.failures += 1;
                TickOutcome::Missed(health.failures)
            };
            health.nudge_sent_at = None;

            if health.failures >= self.thresholds.consecutive_failures {
                self.force_kill(session).await?;
                health.failures = 0;
                health.last_kill_at = Some(now);
                return Ok(TickOutcome::Killed);
            }

            // The expired probe is settled either way; the next one
            // supersedes its slot entry immediately.
            self.send_nudge(session, health, now).await?;
            return Ok(outcome);
        }

        if self.slots.should_send(session, HEALTH_SLOT) {
            self.send_nudge(session, health, now).await?;
        }
        Ok(TickOutcome::Nudged)
    }

    async fn send_nudge(
        &self,
        session: &str,
        health: &mut AgentHealth,
        now: u64,
    ) -> Result<(), DaemonError> {
        self.sessions.send_input(session, HEALTH_CHECK_NUDGE).await?;
        if let Err(e) = self.slots.record_send(session, HEALTH_SLOT, HEALTH_CHECK_NUDGE) {
            tracing::warn!(session, error = %e, "failed to record health nudge");
        }
        health.nudge_sent_at = Some(now);
        Ok(())
    }

    async fn force_kill(&self, session: &str) -> Result<(), DaemonError> {
        tracing::warn!(session, "force-killing stuck session");
        self.townlog.append("deacon", &format!("killed stuck session {session}"));
        self.sessions.kill(session).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "stuck_tests.rs"]
mod tests;
