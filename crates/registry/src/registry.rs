// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker registry: spawn, kill, refresh, and state transitions.
//!
//! Spawn is transactional up to the state-file write: any failure before
//! the file lands rolls back every directory created. After the file is
//! persisted the worker exists, and later failures surface without undo;
//! the daemon's patrols reconcile from there.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use gt_beads::gateway::{BeadsRunner, Gateway};
use gt_beads::stores::agents::{self, AgentRecord, AgentState};
use gt_core::address::Address;
use gt_core::identity::Identity;
use gt_core::role::Role;
use gt_core::roledef::RoleTable;
use gt_core::session_name::session_name;
use gt_core::Clock;
use gt_session::backend::{SessionBackend, SessionSpec};
use gt_session::beacon::{startup_prompt, Topic};

use crate::error::RegistryError;
use crate::hooks::run_setup_hooks;
use crate::state_file::{WorkerState, WorkerStatus};
use crate::worktree;

/// A rig this registry provisions worktrees for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigRef {
    pub name: String,
    pub default_branch: String,
}

/// Static shape of one worker class.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub role: Role,
    pub town_root: PathBuf,
    /// Parent of named worker dirs, or the worker dir itself for
    /// singleton roles (witness, refinery).
    pub worker_root: PathBuf,
    /// e.g. `.dog.json`, `.polecat.json`
    pub state_file_name: String,
    /// Owning rig for rig-level classes; empty for town classes.
    pub rig: String,
    /// Store prefix used in rig session names (`gt`).
    pub rig_prefix: String,
    /// Rigs provisioned per worker: all town rigs for dogs, the single
    /// owning rig for rig-level classes.
    pub rigs: Vec<RigRef>,
}

/// Inputs for one spawn.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub name: String,
    pub topic: Topic,
    /// Work bead placed on the hook before the agent wakes.
    pub hook: Option<String>,
    pub mol_id: Option<String>,
    /// Beacon sender address.
    pub sender: String,
}

pub struct Registry<R, B, C> {
    config: RegistryConfig,
    gw: Arc<Gateway<R>>,
    sessions: B,
    clock: C,
    roles: RoleTable,
}

impl<R: BeadsRunner, B: SessionBackend, C: Clock> Registry<R, B, C> {
    pub fn new(
        config: RegistryConfig,
        gw: Arc<Gateway<R>>,
        sessions: B,
        roles: RoleTable,
        clock: C,
    ) -> Self {
        Self { config, gw, sessions, clock, roles }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn identity(&self, name: &str) -> Identity {
        Identity {
            role: self.config.role,
            rig: self.config.rig.clone(),
            name: name.to_string(),
        }
    }

    /// Store prefix for this class's agent beads: town roles live under
    /// `hq`, rig roles under the rig's prefix.
    fn bead_prefix(&self) -> &str {
        if self.config.role.is_town_level() {
            "hq"
        } else {
            &self.config.rig_prefix
        }
    }

    pub fn bead_id(&self, name: &str) -> Result<String, RegistryError> {
        Ok(self.identity(name).bead_id(self.bead_prefix())?)
    }

    pub fn session_name_for(&self, name: &str) -> String {
        session_name(&self.identity(name), &self.config.rig_prefix)
    }

    fn worker_dir(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            self.config.worker_root.clone()
        } else {
            self.config.worker_root.join(name)
        }
    }

    fn state_path(&self, name: &str) -> PathBuf {
        self.worker_dir(name).join(&self.config.state_file_name)
    }

    /// Spawn a worker: uniqueness, directories, one worktree per rig,
    /// setup hooks, state file, agent bead, session with beacon.
    pub async fn spawn(&self, req: &SpawnRequest) -> Result<WorkerState, RegistryError> {
        let bead_id = self.bead_id(&req.name)?;
        let state_path = self.state_path(&req.name);
        if state_path.exists() {
            return Err(RegistryError::NameTaken(req.name.clone()));
        }

        let worker_dir = self.worker_dir(&req.name);
        let created_worker_dir = !worker_dir.exists();
        if created_worker_dir {
            std::fs::create_dir_all(&worker_dir).map_err(|source| RegistryError::StateIo {
                path: worker_dir.display().to_string(),
                source,
            })?;
        }

        let millis = self.clock.epoch_ms();
        let branch_owner = if req.name.is_empty() {
            self.config.role.as_str()
        } else {
            req.name.as_str()
        };

        let mut worktrees = BTreeMap::new();
        let mut branches = BTreeMap::new();
        let mut provisioned: Vec<(PathBuf, PathBuf)> = Vec::new(); // (source, path)

        for rig in &self.config.rigs {
            let source = worktree::repo_source(&self.config.town_root, &rig.name);
            let branch =
                worktree::branch_name(self.config.role.as_str(), branch_owner, &rig.name, millis);
            let path = worker_dir.join(&rig.name);
            let start_point = format!("origin/{}", rig.default_branch);

            if let Err(e) = worktree::add(&source, &path, &branch, &start_point).await {
                self.rollback(&provisioned, created_worker_dir.then_some(&worker_dir)).await;
                return Err(e);
            }
            run_setup_hooks(&self.config.town_root.join(&rig.name), &path).await;

            provisioned.push((source, path.clone()));
            worktrees.insert(rig.name.clone(), path);
            branches.insert(rig.name.clone(), branch);
        }

        let state = WorkerState {
            name: req.name.clone(),
            role: self.config.role.as_str().to_string(),
            rig: self.config.rig.clone(),
            status: if req.hook.is_some() { WorkerStatus::Working } else { WorkerStatus::Idle },
            work: req.hook.clone(),
            worktrees,
            branches,
            created_at: millis,
            last_active: millis,
        };
        if let Err(e) = state.save(&state_path) {
            self.rollback(&provisioned, created_worker_dir.then_some(&worker_dir)).await;
            return Err(e);
        }

        // State file is persisted: the worker exists from here on.
        let record = AgentRecord {
            id: bead_id,
            role: Some(self.config.role),
            rig: self.config.rig.clone(),
            state: AgentState::Spawning,
            ..Default::default()
        };
        agents::create_or_reopen(&self.gw, &record, req.hook.as_deref()).await?;

        self.start_session(req, &state).await?;
        Ok(state)
    }

    async fn start_session(
        &self,
        req: &SpawnRequest,
        state: &WorkerState,
    ) -> Result<(), RegistryError> {
        let identity = self.identity(&req.name);
        let def = self.roles.get(self.config.role);
        let session = self.session_name_for(&req.name);

        let workdir = state
            .worktrees
            .get(&self.config.rig)
            .cloned()
            .or_else(|| state.worktrees.values().next().cloned())
            .unwrap_or_else(|| self.worker_dir(&req.name));

        let mut env = def.env.clone();
        env.insert("GT_ROLE".to_string(), self.config.role.as_str().to_string());
        if !self.config.rig.is_empty() {
            env.insert("GT_RIG".to_string(), self.config.rig.clone());
        }
        if !req.name.is_empty() {
            env.insert("GT_NAME".to_string(), req.name.clone());
        }

        self.sessions
            .create(&SessionSpec {
                name: session.clone(),
                command: def.start_command.clone().unwrap_or_default(),
                workdir,
                env,
            })
            .await?;

        let recipient = Address::from(identity).to_string();
        let prompt = startup_prompt(
            req.topic,
            &recipient,
            &req.sender,
            req.mol_id.as_deref(),
            def.startup_instructions.as_deref(),
        );
        self.sessions.send_input(&session, prompt.trim_end()).await?;
        Ok(())
    }

    async fn rollback(&self, provisioned: &[(PathBuf, PathBuf)], worker_dir: Option<&PathBuf>) {
        for (source, path) in provisioned {
            worktree::remove(source, path).await;
            worktree::prune(source).await;
        }
        if let Some(dir) = worker_dir {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "spawn rollback failed to remove dir");
            }
        }
    }

    /// Tear a worker down. Idempotent: every step tolerates absence.
    pub async fn kill(&self, name: &str) -> Result<(), RegistryError> {
        let state_path = self.state_path(name);
        let state = WorkerState::load_if_exists(&state_path)?;

        if let Some(ref state) = state {
            for (rig, path) in &state.worktrees {
                let source = worktree::repo_source(&self.config.town_root, rig);
                worktree::remove(&source, path).await;
                worktree::prune(&source).await;
            }
        }

        let worker_dir = self.worker_dir(name);
        if worker_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&worker_dir) {
                tracing::warn!(dir = %worker_dir.display(), error = %e, "failed to remove worker dir");
            }
        }

        // Clears the hook and all mutable fields, then closes the bead
        agents::close(&self.gw, &self.bead_id(name)?).await?;

        self.sessions.kill(&self.session_name_for(name)).await?;
        Ok(())
    }

    /// Rebuild worktrees (all, or one rig) on fresh branches, preserving
    /// the worker's identity and state-file fields.
    pub async fn refresh(&self, name: &str, only_rig: Option<&str>) -> Result<(), RegistryError> {
        let state_path = self.state_path(name);
        let mut state = WorkerState::load_if_exists(&state_path)?
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        let millis = self.clock.epoch_ms();
        let branch_owner = if name.is_empty() { self.config.role.as_str() } else { name };

        for rig in &self.config.rigs {
            if only_rig.is_some_and(|r| r != rig.name) {
                continue;
            }
            let Some(path) = state.worktrees.get(&rig.name).cloned() else {
                continue;
            };
            let source = worktree::repo_source(&self.config.town_root, &rig.name);
            worktree::remove(&source, &path).await;
            worktree::prune(&source).await;

            let branch =
                worktree::branch_name(self.config.role.as_str(), branch_owner, &rig.name, millis);
            worktree::add(&source, &path, &branch, &format!("origin/{}", rig.default_branch))
                .await?;
            state.branches.insert(rig.name.clone(), branch);
        }

        state.last_active = millis;
        state.save(&state_path)
    }

    /// Delete `<role>/*` branches no live worker owns. Returns the deleted
    /// branch names. Individual delete failures warn and continue.
    pub async fn cleanup_stale_branches(&self) -> Result<Vec<String>, RegistryError> {
        let live: HashSet<String> =
            self.list()?.into_iter().flat_map(|s| s.branches.into_values()).collect();

        let mut deleted = Vec::new();
        for rig in &self.config.rigs {
            let source = worktree::repo_source(&self.config.town_root, &rig.name);
            worktree::prune(&source).await;
            for branch in worktree::list_role_branches(&source, self.config.role.as_str()).await? {
                if live.contains(&branch) {
                    continue;
                }
                match worktree::delete_branch(&source, &branch).await {
                    Ok(()) => deleted.push(branch),
                    Err(e) => {
                        tracing::warn!(branch, error = %e, "failed to delete stale branch")
                    }
                }
            }
        }
        Ok(deleted)
    }

    pub fn set_status(&self, name: &str, status: WorkerStatus) -> Result<(), RegistryError> {
        self.mutate_state(name, |state| {
            state.status = status;
            if status == WorkerStatus::Idle {
                state.work = None;
            }
        })
    }

    /// Put work on the worker: state file goes working, the agent bead's
    /// hook follows.
    pub async fn assign_work(&self, name: &str, work: &str) -> Result<(), RegistryError> {
        self.mutate_state(name, |state| {
            state.status = WorkerStatus::Working;
            state.work = Some(work.to_string());
        })?;
        agents::set_hook(&self.gw, &self.bead_id(name)?, work).await?;
        Ok(())
    }

    pub async fn clear_work(&self, name: &str) -> Result<(), RegistryError> {
        self.mutate_state(name, |state| {
            state.status = WorkerStatus::Idle;
            state.work = None;
        })?;
        agents::set_hook(&self.gw, &self.bead_id(name)?, "").await?;
        Ok(())
    }

    fn mutate_state(
        &self,
        name: &str,
        f: impl FnOnce(&mut WorkerState),
    ) -> Result<(), RegistryError> {
        let path = self.state_path(name);
        let mut state = WorkerState::load_if_exists(&path)?
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        f(&mut state);
        state.last_active = self.clock.epoch_ms();
        state.save(&path)
    }

    /// All live workers of this class, by state file.
    pub fn list(&self) -> Result<Vec<WorkerState>, RegistryError> {
        // Singleton classes keep their state file directly in worker_root
        if let Some(state) =
            WorkerState::load_if_exists(&self.config.worker_root.join(&self.config.state_file_name))?
        {
            return Ok(vec![state]);
        }
        let Ok(entries) = std::fs::read_dir(&self.config.worker_root) else {
            return Ok(vec![]);
        };
        let mut workers = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path().join(&self.config.state_file_name);
            if let Some(state) = WorkerState::load_if_exists(&path)? {
                workers.push(state);
            }
        }
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(workers)
    }

    pub fn idle_count(&self) -> Result<usize, RegistryError> {
        Ok(self.list()?.iter().filter(|s| s.status == WorkerStatus::Idle).count())
    }

    pub fn working_count(&self) -> Result<usize, RegistryError> {
        Ok(self.list()?.iter().filter(|s| s.status == WorkerStatus::Working).count())
    }

    /// First idle worker by name order, if any.
    pub fn get_idle(&self) -> Result<Option<WorkerState>, RegistryError> {
        Ok(self.list()?.into_iter().find(|s| s.status == WorkerStatus::Idle))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
