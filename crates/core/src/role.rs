// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker role taxonomy.
//!
//! Roles split into town-level (mayor, deacon, dog) and rig-level
//! (witness, refinery, crew, polecat). Which combinations of rig and
//! name a role accepts is encoded here; identity validation leans on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a supervised worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Town singleton: the human operator's seat
    Mayor,
    /// Town singleton: the supervisor's own agent
    Deacon,
    /// Town-level named worker managed by the deacon
    Dog,
    /// Rig singleton: reviews polecat output
    Witness,
    /// Rig singleton: owns the merge queue
    Refinery,
    /// Rig-level named long-lived worker
    Crew,
    /// Rig-level named ephemeral worker
    Polecat,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Mayor,
        Role::Deacon,
        Role::Dog,
        Role::Witness,
        Role::Refinery,
        Role::Crew,
        Role::Polecat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mayor => "mayor",
            Role::Deacon => "deacon",
            Role::Dog => "dog",
            Role::Witness => "witness",
            Role::Refinery => "refinery",
            Role::Crew => "crew",
            Role::Polecat => "polecat",
        }
    }

    /// Parse a single hyphen-delimited token as a role.
    pub fn from_token(token: &str) -> Option<Role> {
        match token {
            "mayor" => Some(Role::Mayor),
            "deacon" => Some(Role::Deacon),
            "dog" => Some(Role::Dog),
            "witness" => Some(Role::Witness),
            "refinery" => Some(Role::Refinery),
            "crew" => Some(Role::Crew),
            "polecat" => Some(Role::Polecat),
            _ => None,
        }
    }

    /// Town-level roles live outside any rig and session under `hq-`.
    pub fn is_town_level(&self) -> bool {
        matches!(self, Role::Mayor | Role::Deacon | Role::Dog)
    }

    pub fn requires_rig(&self) -> bool {
        matches!(
            self,
            Role::Witness | Role::Refinery | Role::Crew | Role::Polecat
        )
    }

    pub fn requires_name(&self) -> bool {
        matches!(self, Role::Dog | Role::Crew | Role::Polecat)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
