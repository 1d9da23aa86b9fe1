// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent records (label `gt:agent`).
//!
//! Created on worker spawn, closed (never hard-deleted) on kill, reopened
//! on re-spawn of the same name. Hard-delete leaves a tombstone in the
//! store that blocks the next create, so `create_or_reopen` is the only
//! create path registries use.

use gt_core::envelope::{format_envelope, parse_envelope};
use gt_core::role::Role;
use serde::{Deserialize, Serialize};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway, UpdateSpec};
use crate::record::{labels, slots, status, Bead};

/// Advisory operational state, mirrored to the `agent_state` slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    #[default]
    Spawning,
    Working,
    Done,
    Stuck,
    Closed,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Spawning => "spawning",
            AgentState::Working => "working",
            AgentState::Done => "done",
            AgentState::Stuck => "stuck",
            AgentState::Closed => "closed",
        }
    }

    pub fn from_str_lenient(s: &str) -> Self {
        match s {
            "working" => AgentState::Working,
            "done" => AgentState::Done,
            "stuck" => AgentState::Stuck,
            "closed" => AgentState::Closed,
            _ => AgentState::Spawning,
        }
    }
}

/// Worktree hygiene at last inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStatus {
    #[default]
    Clean,
    HasUncommitted,
    HasStash,
    HasUnpushed,
}

impl CleanupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleanupStatus::Clean => "clean",
            CleanupStatus::HasUncommitted => "has_uncommitted",
            CleanupStatus::HasStash => "has_stash",
            CleanupStatus::HasUnpushed => "has_unpushed",
        }
    }

    pub fn from_str_lenient(s: &str) -> Self {
        match s {
            "has_uncommitted" => CleanupStatus::HasUncommitted,
            "has_stash" => CleanupStatus::HasStash,
            "has_unpushed" => CleanupStatus::HasUnpushed,
            _ => CleanupStatus::Clean,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Verbose,
    #[default]
    Normal,
    Muted,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Verbose => "verbose",
            NotificationLevel::Normal => "normal",
            NotificationLevel::Muted => "muted",
        }
    }

    pub fn from_str_lenient(s: &str) -> Self {
        match s {
            "verbose" => NotificationLevel::Verbose,
            "muted" => NotificationLevel::Muted,
            _ => NotificationLevel::Normal,
        }
    }
}

/// The typed view of an agent bead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRecord {
    pub id: String,
    pub role: Option<Role>,
    pub rig: String,
    pub state: AgentState,
    pub hook_bead: String,
    pub cleanup_status: CleanupStatus,
    pub active_mr: String,
    pub notification_level: NotificationLevel,
}

impl AgentRecord {
    pub fn title(&self) -> String {
        match self.role {
            Some(role) => format!("Agent {} ({})", self.id, role),
            None => format!("Agent {}", self.id),
        }
    }
}

/// Envelope for the agent description. Fixed key order.
pub fn format_description(rec: &AgentRecord) -> String {
    let role = rec.role.map(|r| r.as_str());
    format_envelope(
        &rec.title(),
        &[
            ("role_type", role),
            ("rig", non_empty(&rec.rig)),
            ("agent_state", Some(rec.state.as_str())),
            ("hook_bead", non_empty(&rec.hook_bead)),
            ("cleanup_status", Some(rec.cleanup_status.as_str())),
            ("active_mr", non_empty(&rec.active_mr)),
            ("notification_level", Some(rec.notification_level.as_str())),
        ],
    )
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse an agent bead. The `hook` slot is the index; the envelope is the
/// authoritative backup: the slot wins only when both are present and the
/// slot is non-empty.
pub fn parse(bead: &Bead) -> AgentRecord {
    let env = parse_envelope(&bead.description);
    let hook_from_env = env.get("hook_bead").to_string();
    let hook = match bead.slot(slots::HOOK) {
        Some(slot) if !slot.is_empty() => slot.to_string(),
        _ => hook_from_env,
    };
    AgentRecord {
        id: bead.id.clone(),
        role: Role::from_token(env.get("role_type")),
        rig: env.get("rig").to_string(),
        state: AgentState::from_str_lenient(env.get("agent_state")),
        hook_bead: hook,
        cleanup_status: CleanupStatus::from_str_lenient(env.get("cleanup_status")),
        active_mr: env.get("active_mr").to_string(),
        notification_level: NotificationLevel::from_str_lenient(env.get("notification_level")),
    }
}

/// Create the agent record, or reopen and reset a closed tombstone with
/// the same ID. `hook` is cleared before being optionally re-set so a
/// re-spawned worker never inherits stale work.
pub async fn create_or_reopen<R: BeadsRunner>(
    gw: &Gateway<R>,
    rec: &AgentRecord,
    hook: Option<&str>,
) -> Result<(), BeadsError> {
    let spec = CreateSpec {
        id: rec.id.clone(),
        title: rec.title(),
        description: format_description(rec),
        issue_type: "agent".to_string(),
        labels: vec![labels::AGENT.to_string()],
    };
    match gw.create(&spec).await {
        Ok(()) => {}
        Err(BeadsError::Duplicate(_)) => {
            gw.reopen(&rec.id).await?;
            gw.update(
                &rec.id,
                &UpdateSpec {
                    title: Some(rec.title()),
                    description: Some(format_description(rec)),
                    status: Some(status::OPEN.to_string()),
                },
            )
            .await?;
            gw.clear_slot(&rec.id, slots::HOOK).await?;
        }
        Err(e) => return Err(e),
    }
    gw.set_slot(&rec.id, slots::AGENT_STATE, rec.state.as_str()).await?;
    if let Some(hook) = hook {
        gw.set_slot(&rec.id, slots::HOOK, hook).await?;
    }
    Ok(())
}

pub async fn get<R: BeadsRunner>(gw: &Gateway<R>, id: &str) -> Result<AgentRecord, BeadsError> {
    Ok(parse(&gw.show(id).await?))
}

pub async fn list<R: BeadsRunner>(gw: &Gateway<R>) -> Result<Vec<AgentRecord>, BeadsError> {
    Ok(gw.list(&[labels::AGENT], None).await?.iter().map(parse).collect())
}

pub async fn set_state<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    state: AgentState,
) -> Result<(), BeadsError> {
    let mut rec = get(gw, id).await?;
    rec.state = state;
    gw.update(id, &UpdateSpec { description: Some(format_description(&rec)), ..Default::default() })
        .await?;
    gw.set_slot(id, slots::AGENT_STATE, state.as_str()).await
}

pub async fn set_hook<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    hook: &str,
) -> Result<(), BeadsError> {
    let mut rec = get(gw, id).await?;
    rec.hook_bead = hook.to_string();
    gw.update(id, &UpdateSpec { description: Some(format_description(&rec)), ..Default::default() })
        .await?;
    if hook.is_empty() {
        gw.clear_slot(id, slots::HOOK).await
    } else {
        gw.set_slot(id, slots::HOOK, hook).await
    }
}

/// Clear all mutable fields then transition the record to closed.
pub async fn close<R: BeadsRunner>(gw: &Gateway<R>, id: &str) -> Result<(), BeadsError> {
    let mut rec = match get(gw, id).await {
        Ok(rec) => rec,
        Err(BeadsError::NotFound(_)) => return Ok(()), // already gone; close is idempotent
        Err(e) => return Err(e),
    };
    rec.state = AgentState::Closed;
    rec.hook_bead = String::new();
    rec.active_mr = String::new();
    gw.update(id, &UpdateSpec { description: Some(format_description(&rec)), ..Default::default() })
        .await?;
    gw.clear_slot(id, slots::HOOK).await?;
    gw.set_slot(id, slots::AGENT_STATE, AgentState::Closed.as_str()).await?;
    gw.close(id).await
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
