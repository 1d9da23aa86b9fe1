// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor run loop.
//!
//! `run` acquires the pid lock, writes the state file, and spawns one
//! cooperatively-cancellable task per concern: heartbeat, five patrols,
//! and the lifecycle-request tail. Tasks talk to each other only through
//! the store and the filesystem; cancellation is the root token, and
//! shutdown waits a bounded grace for everything to drain.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gt_beads::gateway::{BeadsRunner, Gateway};
use gt_beads::stores::agents::{self, AgentState};
use gt_beads::stores::merge_requests;
use gt_beads::MergeSlot;
use gt_core::config::{DaemonConfig, RigsConfig};
use gt_core::role::Role;
use gt_core::roledef::RoleTable;
use gt_core::session_name::{parse_session_name, session_name, BOOT_SESSION};
use gt_core::Clock;
use gt_core::Identity;
use gt_mail::{Mailroom, SlotStore};
use gt_session::backend::SessionBackend;

use crate::error::DaemonError;
use crate::lifecycle::{self, Applied};
use crate::patrol::{self, names};
use crate::paths;
use crate::retention;
use crate::stale_hooks;
use crate::state::{DaemonState, PidFile};
use crate::stuck::StuckDetector;
use crate::townlog::TownLog;

/// Grace period for observers to drain after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const DEFAULT_HEARTBEAT_SECS: u64 = 300;
const LIFECYCLE_POLL: Duration = Duration::from_secs(2);
/// Inbox polls per request-file poll (inbox is store traffic, files are
/// cheap).
const INBOX_EVERY: u32 = 5;

/// Everything the daemon needs injected.
pub struct DaemonDeps<R, B, C> {
    pub gw: Arc<Gateway<R>>,
    pub sessions: B,
    pub clock: C,
    pub town_root: PathBuf,
}

pub struct Daemon<R, B, C> {
    deps: DaemonDeps<R, B, C>,
    config: DaemonConfig,
    rigs: RigsConfig,
    roles: RoleTable,
    cancel: CancellationToken,
    townlog: TownLog,
}

impl<R, B, C> Daemon<R, B, C>
where
    R: BeadsRunner + Send + Sync + 'static,
    B: SessionBackend + Clone + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(
        deps: DaemonDeps<R, B, C>,
        config: DaemonConfig,
        rigs: RigsConfig,
        roles: RoleTable,
    ) -> Self {
        let townlog = TownLog::new(&deps.town_root);
        Self { deps, config, rigs, roles, cancel: CancellationToken::new(), townlog }
    }

    /// Root cancellation token; signal handlers and the CLI cancel this.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<(), DaemonError> {
        let town = self.deps.town_root.clone();
        let pid = std::process::id();
        let pid_file = PidFile::acquire(&town, pid)?;

        DaemonState {
            running: true,
            pid,
            started_at: Some(chrono::Utc::now().to_rfc3339()),
            last_heartbeat: self.deps.clock.epoch_ms(),
            heartbeat_count: 0,
        }
        .save(&town)?;
        self.townlog.append("daemon", &format!("started (pid {pid})"));

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        handles.push(self.spawn_heartbeat());
        handles.push(self.spawn_deacon_patrol());
        handles.push(self.spawn_retention_patrol());
        handles.push(self.spawn_stale_hook_patrol());
        handles.push(self.spawn_witness_patrol());
        handles.push(self.spawn_refinery_patrol());
        handles.push(self.spawn_lifecycle_tail());

        self.cancel.cancelled().await;
        tracing::info!("daemon cancelled; draining observers");

        for handle in handles {
            if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
                tracing::warn!("observer did not drain within grace; abandoning");
            }
        }

        if let Some(mut state) = DaemonState::load(&town)? {
            state.running = false;
            state.save(&town)?;
        }
        pid_file.remove();
        self.townlog.append("daemon", "stopped");
        Ok(())
    }

    fn spawn_heartbeat(&self) -> JoinHandle<()> {
        let town = self.deps.town_root.clone();
        let clock = self.deps.clock.clone();
        let cancel = self.cancel.clone();
        let interval = Duration::from_secs(
            self.config.heartbeat_interval_secs.unwrap_or(DEFAULT_HEARTBEAT_SECS),
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                match DaemonState::load(&town) {
                    Ok(Some(mut state)) => {
                        state.last_heartbeat = clock.epoch_ms();
                        state.heartbeat_count += 1;
                        if let Err(e) = state.save(&town) {
                            tracing::warn!(error = %e, "heartbeat save failed");
                        }
                    }
                    Ok(None) => tracing::warn!("daemon state file missing at heartbeat"),
                    Err(e) => tracing::warn!(error = %e, "heartbeat load failed"),
                }
            }
        })
    }

    fn spawn_deacon_patrol(&self) -> JoinHandle<()> {
        let sessions = self.deps.sessions.clone();
        let clock = self.deps.clock.clone();
        let town = self.deps.town_root.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let rig_names = self.rigs.rig_names();
        let thresholds = self.roles.get(Role::Deacon).health.clone();
        let townlog = self.townlog.clone();

        tokio::spawn(async move {
            let detector = StuckDetector::new(
                sessions.clone(),
                paths::notification_dir(&town),
                clock,
                thresholds.clone(),
                paths::health_state_file(&town),
                townlog,
            );
            let interval = Duration::from_secs(thresholds.ping_timeout_secs.max(1));
            patrol::run_patrol_loop(names::DEACON, interval, &town, &config, cancel, || {
                let detector = &detector;
                let sessions = sessions.clone();
                let rig_names = rig_names.clone();
                async move {
                    let monitored = monitored_sessions(&sessions, &rig_names).await?;
                    detector.tick(&monitored).await?;
                    Ok(())
                }
            })
            .await;
        })
    }

    fn spawn_retention_patrol(&self) -> JoinHandle<()> {
        let gw = self.deps.gw.clone();
        let clock = self.deps.clock.clone();
        let town = self.deps.town_root.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let interval = Duration::from_secs(600);
            patrol::run_patrol_loop(names::RETENTION, interval, &town, &config, cancel, || {
                let gw = gw.clone();
                let clock = clock.clone();
                async move {
                    retention::prune_channels(&gw, &clock).await?;
                    Ok(())
                }
            })
            .await;
        })
    }

    fn spawn_stale_hook_patrol(&self) -> JoinHandle<()> {
        let gw = self.deps.gw.clone();
        let sessions = self.deps.sessions.clone();
        let clock = self.deps.clock.clone();
        let town = self.deps.town_root.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let max_age = self.roles.get(Role::Deacon).health.hook_max_age_minutes;
        let townlog = self.townlog.clone();
        tokio::spawn(async move {
            let interval = Duration::from_secs(600);
            patrol::run_patrol_loop(names::STALE_HOOKS, interval, &town, &config, cancel, || {
                let gw = gw.clone();
                let sessions = sessions.clone();
                let clock = clock.clone();
                let townlog = townlog.clone();
                async move {
                    stale_hooks::reclaim(&gw, &sessions, &clock, &townlog, max_age).await?;
                    Ok(())
                }
            })
            .await;
        })
    }

    fn spawn_witness_patrol(&self) -> JoinHandle<()> {
        let gw = self.deps.gw.clone();
        let sessions = self.deps.sessions.clone();
        let clock = self.deps.clock.clone();
        let town = self.deps.town_root.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let rigs = self.rigs.clone();
        tokio::spawn(async move {
            let slots =
                SlotStore::new(paths::notification_dir(&town), SlotStore::<C>::DEFAULT_MAX_AGE, clock);
            let interval = Duration::from_secs(60);
            patrol::run_patrol_loop(names::WITNESS, interval, &town, &config, cancel, || {
                let gw = gw.clone();
                let sessions = sessions.clone();
                let rigs = rigs.clone();
                let slots = &slots;
                async move {
                    witness_patrol(&gw, &sessions, slots, &rigs).await?;
                    Ok(())
                }
            })
            .await;
        })
    }

    fn spawn_refinery_patrol(&self) -> JoinHandle<()> {
        let gw = self.deps.gw.clone();
        let sessions = self.deps.sessions.clone();
        let clock = self.deps.clock.clone();
        let town = self.deps.town_root.clone();
        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let rigs = self.rigs.clone();
        tokio::spawn(async move {
            let slots =
                SlotStore::new(paths::notification_dir(&town), SlotStore::<C>::DEFAULT_MAX_AGE, clock);
            let interval = Duration::from_secs(60);
            patrol::run_patrol_loop(names::REFINERY, interval, &town, &config, cancel, || {
                let gw = gw.clone();
                let sessions = sessions.clone();
                let rigs = rigs.clone();
                let slots = &slots;
                async move {
                    refinery_patrol(&gw, &sessions, slots, &rigs).await?;
                    Ok(())
                }
            })
            .await;
        })
    }

    fn spawn_lifecycle_tail(&self) -> JoinHandle<()> {
        let gw = self.deps.gw.clone();
        let sessions = self.deps.sessions.clone();
        let clock = self.deps.clock.clone();
        let town = self.deps.town_root.clone();
        let cancel = self.cancel.clone();
        let roles = self.roles.clone();
        let rigs = self.rigs.clone();
        let townlog = self.townlog.clone();
        tokio::spawn(async move {
            let mailroom = Mailroom::new(gw, clock);
            let mut ticks: u32 = 0;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(LIFECYCLE_POLL) => {}
                }

                let mut requests = lifecycle::take_requests(&town);
                ticks = ticks.wrapping_add(1);
                if ticks % INBOX_EVERY == 0 {
                    match lifecycle::poll_inbox(&mailroom, "deacon").await {
                        Ok(from_inbox) => requests.extend(from_inbox),
                        Err(e) => tracing::warn!(error = %e, "lifecycle inbox poll failed"),
                    }
                }

                for request in requests {
                    match lifecycle::apply(&sessions, &roles, &rigs, &town, &request).await {
                        Ok(Applied::DaemonShutdown) => {
                            townlog.append("daemon", "lifecycle shutdown request");
                            cancel.cancel();
                        }
                        Ok(applied) => {
                            tracing::info!(?applied, from = %request.from, "lifecycle request applied");
                            townlog.append(
                                "daemon",
                                &format!("{} for {}", request.action.as_str(), request.from),
                            );
                        }
                        Err(e) => {
                            tracing::warn!(from = %request.from, error = %e, "lifecycle apply failed")
                        }
                    }
                }
            }
        })
    }
}

/// Sessions the deacon watches: every agent session except the mayor's
/// own seat and the boot shell.
pub async fn monitored_sessions<B: SessionBackend>(
    sessions: &B,
    rig_names: &[String],
) -> Result<Vec<String>, DaemonError> {
    let mut monitored = Vec::new();
    for name in sessions.list().await? {
        if name == BOOT_SESSION || name == "hq-mayor" {
            continue;
        }
        if parse_session_name(&name, rig_names).is_some() {
            monitored.push(name);
        }
    }
    Ok(monitored)
}

/// Nudge slot used when polecats report done.
pub const WITNESS_SLOT: &str = "polecat_done";
/// Nudge slot used when open MRs await the refinery.
pub const REFINERY_SLOT: &str = "merge_queue";

/// Witness patrol: when a rig has polecats in state `done`, nudge that
/// rig's witness session (deduplicated through the slot store).
pub async fn witness_patrol<R: BeadsRunner, B: SessionBackend, C: Clock>(
    gw: &Gateway<R>,
    sessions: &B,
    slots: &SlotStore<C>,
    rigs: &RigsConfig,
) -> Result<Vec<String>, DaemonError> {
    let agents = agents::list(gw).await?;
    let mut nudged = Vec::new();

    for (rig, entry) in &rigs.rigs {
        let done: Vec<&str> = agents
            .iter()
            .filter(|a| {
                a.rig == *rig && a.role == Some(Role::Polecat) && a.state == AgentState::Done
            })
            .map(|a| a.id.as_str())
            .collect();
        if done.is_empty() {
            continue;
        }

        let witness = session_name(&Identity::rig_singleton(Role::Witness, rig), &entry.prefix);
        if !sessions.exists(&witness).await? {
            continue;
        }
        if !slots.should_send(&witness, WITNESS_SLOT) {
            continue;
        }
        let message = format!("Polecats report done: {}. Review their work.", done.join(", "));
        sessions.send_input(&witness, &message).await?;
        if let Err(e) = slots.record_send(&witness, WITNESS_SLOT, &message) {
            tracing::warn!(session = %witness, error = %e, "failed to record witness nudge");
        }
        nudged.push(witness);
    }
    Ok(nudged)
}

/// Refinery patrol: keep each rig's merge slot present and nudge the
/// refinery while open MRs wait.
pub async fn refinery_patrol<R: BeadsRunner, B: SessionBackend, C: Clock>(
    gw: &Gateway<R>,
    sessions: &B,
    slots: &SlotStore<C>,
    rigs: &RigsConfig,
) -> Result<Vec<String>, DaemonError> {
    let open_mrs = gw.list(&[gt_beads::record::labels::MERGE_REQUEST], Some("open")).await?;
    let mut nudged = Vec::new();

    for (rig, entry) in &rigs.rigs {
        MergeSlot::for_rig(&entry.prefix, rig).create(gw).await?;
        if open_mrs.is_empty() {
            continue;
        }

        let refinery = session_name(&Identity::rig_singleton(Role::Refinery, rig), &entry.prefix);
        if !sessions.exists(&refinery).await? {
            continue;
        }
        if !slots.should_send(&refinery, REFINERY_SLOT) {
            continue;
        }
        let branches: Vec<String> =
            open_mrs.iter().map(|b| merge_requests::parse(b).branch).collect();
        let message = format!("Merge queue has {} open MRs: {}", branches.len(), branches.join(", "));
        sessions.send_input(&refinery, &message).await?;
        if let Err(e) = slots.record_send(&refinery, REFINERY_SLOT, &message) {
            tracing::warn!(session = %refinery, error = %e, "failed to record refinery nudge");
        }
        nudged.push(refinery);
    }
    Ok(nudged)
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
