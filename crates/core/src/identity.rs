// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity: the (role, rig, name) triple and its bead-ID codec.
//!
//! Bead IDs are pure functions of identity plus the owning prefix:
//!
//! - town singleton: `<prefix>-<role>`
//! - town named:     `<prefix>-<role>-<name>`
//! - rig singleton:  `<prefix>-<rig>-<role>`
//! - rig named:      `<prefix>-<rig>-<role>-<name>`
//!
//! Rig names may contain hyphens, so parsing scans from the right for a
//! known role token to split rig from name.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation and parse failures for agent identities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("missing prefix in agent id: {0:?}")]
    MissingPrefix(String),
    #[error("empty after prefix in agent id: {0:?}")]
    EmptyAfterPrefix(String),
    #[error("unknown role in agent id: {0:?}")]
    UnknownRole(String),
    #[error("role {0} requires rig")]
    RequiresRig(Role),
    #[error("role {0} requires name")]
    RequiresName(Role),
    #[error("town role {0} cannot have rig")]
    TownRoleWithRig(Role),
    #[error("role {0} cannot have name suffix")]
    NameNotAllowed(Role),
}

/// The (role, rig, name) triple identifying one supervised agent.
///
/// `rig` is empty for town-level roles; `name` is empty for singletons.
/// Constructed values are not implicitly valid; call [`Identity::validate`]
/// (or go through a parse function, which validates).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    #[serde(default)]
    pub rig: String,
    #[serde(default)]
    pub name: String,
}

impl Identity {
    pub fn town(role: Role) -> Self {
        Self { role, rig: String::new(), name: String::new() }
    }

    pub fn dog(name: impl Into<String>) -> Self {
        Self { role: Role::Dog, rig: String::new(), name: name.into() }
    }

    pub fn rig_singleton(role: Role, rig: impl Into<String>) -> Self {
        Self { role, rig: rig.into(), name: String::new() }
    }

    pub fn rig_named(role: Role, rig: impl Into<String>, name: impl Into<String>) -> Self {
        Self { role, rig: rig.into(), name: name.into() }
    }

    /// Check the rig/name combination against the role's requirements.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.role.requires_rig() {
            if self.rig.is_empty() {
                return Err(IdentityError::RequiresRig(self.role));
            }
        } else if !self.rig.is_empty() {
            return Err(IdentityError::TownRoleWithRig(self.role));
        }
        if self.role.requires_name() {
            if self.name.is_empty() {
                return Err(IdentityError::RequiresName(self.role));
            }
        } else if !self.name.is_empty() {
            return Err(IdentityError::NameNotAllowed(self.role));
        }
        Ok(())
    }

    /// Format the bead ID under the given store prefix (e.g. `gt`, `hq`).
    ///
    /// The identity must be valid; invalid combinations yield an error
    /// rather than a malformed ID.
    pub fn bead_id(&self, prefix: &str) -> Result<String, IdentityError> {
        self.validate()?;
        let mut id = String::from(prefix);
        if !self.rig.is_empty() {
            id.push('-');
            id.push_str(&self.rig);
        }
        id.push('-');
        id.push_str(self.role.as_str());
        if !self.name.is_empty() {
            id.push('-');
            id.push_str(&self.name);
        }
        Ok(id)
    }

    /// Parse a bead ID back into (prefix, identity).
    ///
    /// Scans hyphen-separated tokens from the right for a role token, so
    /// hyphenated rig names parse correctly. Validation runs on the result.
    pub fn parse_bead_id(id: &str) -> Result<(String, Identity), IdentityError> {
        let Some((prefix, rest)) = id.split_once('-') else {
            return Err(IdentityError::MissingPrefix(id.to_string()));
        };
        if prefix.is_empty() {
            return Err(IdentityError::MissingPrefix(id.to_string()));
        }
        if rest.is_empty() {
            return Err(IdentityError::EmptyAfterPrefix(id.to_string()));
        }

        let tokens: Vec<&str> = rest.split('-').collect();
        let role_pos = tokens
            .iter()
            .rposition(|t| Role::from_token(t).is_some())
            .ok_or_else(|| IdentityError::UnknownRole(id.to_string()))?;
        // rposition only returns indices whose token parses as a role
        let role = match Role::from_token(tokens[role_pos]) {
            Some(r) => r,
            None => return Err(IdentityError::UnknownRole(id.to_string())),
        };

        let identity = Identity {
            role,
            rig: tokens[..role_pos].join("-"),
            name: tokens[role_pos + 1..].join("-"),
        };
        identity.validate()?;
        Ok((prefix.to_string(), identity))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rig.is_empty(), self.name.is_empty()) {
            (true, true) => write!(f, "{}", self.role),
            (true, false) => write!(f, "{}/{}", self.role, self.name),
            (false, true) => write!(f, "{}/{}", self.rig, self.role),
            (false, false) => write!(f, "{}/{}/{}", self.rig, self.role, self.name),
        }
    }
}

/// First hyphen-separated token of a bead ID.
pub fn extract_prefix(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// True when the external store's prefix-inference heuristic needs the
/// `--force` override: any ID with more than one hyphen.
pub fn needs_force(id: &str) -> bool {
    id.matches('-').count() > 1
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
