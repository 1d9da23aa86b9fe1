// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail-style address codec.
//!
//! Addresses are the human-facing routing paths used in message headers
//! and group membership:
//!
//! - `mayor`, `deacon`
//! - `dogs/<name>`
//! - `<rig>/witness`, `<rig>/refinery`
//! - `<rig>/crew/<name>`
//! - `<rig>/polecats/<name>` (also accepted short: `<rig>/<name>`)

use crate::identity::{Identity, IdentityError};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed mail address, always backed by a valid identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub Identity);

impl Address {
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    /// Parse an address path. The short polecat form `<rig>/<name>` is
    /// accepted when the second segment is not a role or group keyword.
    pub fn parse(path: &str) -> Result<Address, IdentityError> {
        let identity = match path {
            "mayor" => Identity::town(Role::Mayor),
            "deacon" => Identity::town(Role::Deacon),
            _ => {
                let segments: Vec<&str> = path.split('/').collect();
                match segments.as_slice() {
                    ["dogs", name] if !name.is_empty() => Identity::dog(*name),
                    [rig, "witness"] => Identity::rig_singleton(Role::Witness, *rig),
                    [rig, "refinery"] => Identity::rig_singleton(Role::Refinery, *rig),
                    [rig, "crew", name] => Identity::rig_named(Role::Crew, *rig, *name),
                    [rig, "polecats", name] => Identity::rig_named(Role::Polecat, *rig, *name),
                    // Canonical short form for polecats
                    [rig, name] if !rig.is_empty() && !name.is_empty() => {
                        Identity::rig_named(Role::Polecat, *rig, *name)
                    }
                    _ => return Err(IdentityError::UnknownRole(path.to_string())),
                }
            }
        };
        identity.validate()?;
        Ok(Address(identity))
    }
}

impl From<Identity> for Address {
    fn from(identity: Identity) -> Self {
        Address(identity)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = &self.0;
        match id.role {
            Role::Mayor => write!(f, "mayor"),
            Role::Deacon => write!(f, "deacon"),
            Role::Dog => write!(f, "dogs/{}", id.name),
            Role::Witness => write!(f, "{}/witness", id.rig),
            Role::Refinery => write!(f, "{}/refinery", id.rig),
            Role::Crew => write!(f, "{}/crew/{}", id.rig, id.name),
            Role::Polecat => write!(f, "{}/polecats/{}", id.rig, id.name),
        }
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
