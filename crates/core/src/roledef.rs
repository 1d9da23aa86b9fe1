// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role definition tables.
//!
//! All per-role polymorphism is data: session/workdir patterns, the start
//! command, env overrides, and health thresholds live in a table merged
//! from TOML overlays (town over rig over embedded defaults), not in code.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stuck-detection tuning for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Seconds an agent has to answer a HEALTH_CHECK nudge
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,
    /// Consecutive missed nudges before a force-kill
    #[serde(default = "default_consecutive_failures")]
    pub consecutive_failures: u32,
    /// Seconds after a force-kill during which the agent is not killed again
    #[serde(default = "default_kill_cooldown")]
    pub kill_cooldown_secs: u64,
    /// Minutes a hooked bead may sit untouched before reclamation
    #[serde(default = "default_hook_max_age")]
    pub hook_max_age_minutes: u64,
}

fn default_ping_timeout() -> u64 {
    30
}
fn default_consecutive_failures() -> u32 {
    3
}
fn default_kill_cooldown() -> u64 {
    300
}
fn default_hook_max_age() -> u64 {
    60
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            ping_timeout_secs: default_ping_timeout(),
            consecutive_failures: default_consecutive_failures(),
            kill_cooldown_secs: default_kill_cooldown(),
            hook_max_age_minutes: default_hook_max_age(),
        }
    }
}

/// One role's definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDef {
    /// Command launched inside the session
    #[serde(default)]
    pub start_command: Option<String>,
    /// Working-directory pattern relative to the town root
    #[serde(default)]
    pub workdir: Option<String>,
    /// Extra environment for the session
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Instruction block appended to the startup beacon
    #[serde(default)]
    pub startup_instructions: Option<String>,
    #[serde(default)]
    pub health: HealthThresholds,
}

/// Partial role definition as read from a TOML overlay file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleDefOverlay {
    pub start_command: Option<String>,
    pub workdir: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub startup_instructions: Option<String>,
    pub health: Option<HealthThresholds>,
}

#[derive(Debug, thiserror::Error)]
pub enum RoleDefError {
    #[error("invalid role table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown role in overlay: {0:?}")]
    UnknownRole(String),
}

/// The merged role table the supervisor reads from.
#[derive(Debug, Clone)]
pub struct RoleTable {
    defs: BTreeMap<Role, RoleDef>,
}

impl RoleTable {
    /// Embedded defaults: every role present, health thresholds at spec
    /// defaults, interactive roles launched with the agent CLI.
    pub fn embedded() -> Self {
        let mut defs = BTreeMap::new();
        for role in Role::ALL {
            let mut def = RoleDef::default();
            if !matches!(role, Role::Mayor) {
                def.start_command = Some("claude".to_string());
            }
            defs.insert(role, def);
        }
        Self { defs }
    }

    pub fn get(&self, role: Role) -> &RoleDef {
        // embedded() seeds every role; overlays can only replace entries
        self.defs.get(&role).unwrap_or(&EMPTY_DEF)
    }

    /// Parse a TOML overlay (`[polecat]`, `[polecat.health]`, ...).
    pub fn parse_overlay(text: &str) -> Result<BTreeMap<Role, RoleDefOverlay>, RoleDefError> {
        let raw: BTreeMap<String, RoleDefOverlay> = toml::from_str(text)?;
        let mut out = BTreeMap::new();
        for (key, overlay) in raw {
            let role =
                Role::from_token(&key).ok_or_else(|| RoleDefError::UnknownRole(key.clone()))?;
            out.insert(role, overlay);
        }
        Ok(out)
    }

    /// Apply an overlay on top of this table. Later applications win, so
    /// callers layer embedded → town → rig.
    pub fn apply(&mut self, overlay: BTreeMap<Role, RoleDefOverlay>) {
        for (role, patch) in overlay {
            let def = self.defs.entry(role).or_default();
            if let Some(cmd) = patch.start_command {
                def.start_command = Some(cmd);
            }
            if let Some(workdir) = patch.workdir {
                def.workdir = Some(workdir);
            }
            if let Some(instructions) = patch.startup_instructions {
                def.startup_instructions = Some(instructions);
            }
            for (k, v) in patch.env {
                def.env.insert(k, v);
            }
            if let Some(health) = patch.health {
                def.health = health;
            }
        }
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::embedded()
    }
}

static EMPTY_DEF: RoleDef = RoleDef {
    start_command: None,
    workdir: None,
    env: BTreeMap::new(),
    startup_instructions: None,
    health: HealthThresholds {
        ping_timeout_secs: 30,
        consecutive_failures: 3,
        kill_cooldown_secs: 300,
        hook_max_age_minutes: 60,
    },
};

#[cfg(test)]
#[path = "roledef_tests.rs"]
mod tests;
