// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal-session name codec.
//!
//! Session names are flat, tmux-safe strings derived purely from identity:
//!
//! - `hq-mayor`, `hq-deacon`, `hq-dog-<name>`
//! - `<prefix>-<rig>-witness`, `<prefix>-<rig>-refinery`
//! - `<prefix>-<rig>-crew-<name>`
//! - `<prefix>-<rig>-<name>` (polecats carry no role token)
//!
//! Town sessions always use `hq-` so that prefix-matched tmux lookups for a
//! rig prefix never collide with them.

use crate::identity::Identity;
use crate::role::Role;

/// Prefix shared by all town-level sessions.
pub const TOWN_SESSION_PREFIX: &str = "hq";

/// The bootstrap session used before any agent exists.
pub const BOOT_SESSION: &str = "gt-boot";

/// Derive the session name for an identity.
///
/// `rig_prefix` is the owning rig's store prefix (e.g. `gt`); it is ignored
/// for town-level roles, which always use [`TOWN_SESSION_PREFIX`].
pub fn session_name(identity: &Identity, rig_prefix: &str) -> String {
    match identity.role {
        Role::Mayor => format!("{}-mayor", TOWN_SESSION_PREFIX),
        Role::Deacon => format!("{}-deacon", TOWN_SESSION_PREFIX),
        Role::Dog => format!("{}-dog-{}", TOWN_SESSION_PREFIX, identity.name),
        Role::Witness => format!("{}-{}-witness", rig_prefix, identity.rig),
        Role::Refinery => format!("{}-{}-refinery", rig_prefix, identity.rig),
        Role::Crew => format!("{}-{}-crew-{}", rig_prefix, identity.rig, identity.name),
        Role::Polecat => format!("{}-{}-{}", rig_prefix, identity.rig, identity.name),
    }
}

/// Parse a session name back into an identity.
///
/// Polecat sessions carry no role token, so hyphenated rig names make the
/// split ambiguous without the rig catalog; `rigs` supplies the known rig
/// names (longest match wins). Returns `None` for names this codec did not
/// produce (e.g. `gt-boot`, foreign tmux sessions).
pub fn parse_session_name(session: &str, rigs: &[String]) -> Option<Identity> {
    if let Some(rest) = session.strip_prefix("hq-") {
        return match rest {
            "mayor" => Some(Identity::town(Role::Mayor)),
            "deacon" => Some(Identity::town(Role::Deacon)),
            _ => rest
                .strip_prefix("dog-")
                .filter(|name| !name.is_empty())
                .map(Identity::dog),
        };
    }

    let (_prefix, rest) = session.split_once('-')?;
    let mut best: Option<&str> = None;
    for rig in rigs {
        if rest.strip_prefix(rig.as_str()).is_some_and(|r| r.starts_with('-')) {
            match best {
                Some(b) if b.len() >= rig.len() => {}
                _ => best = Some(rig),
            }
        }
    }
    let rig = best?;
    let tail = &rest[rig.len() + 1..];

    let identity = match tail {
        "witness" => Identity::rig_singleton(Role::Witness, rig),
        "refinery" => Identity::rig_singleton(Role::Refinery, rig),
        _ => {
            if let Some(name) = tail.strip_prefix("crew-").filter(|n| !n.is_empty()) {
                Identity::rig_named(Role::Crew, rig, name)
            } else if !tail.is_empty() {
                Identity::rig_named(Role::Polecat, rig, tail)
            } else {
                return None;
            }
        }
    };
    Some(identity)
}

#[cfg(test)]
#[path = "session_name_tests.rs"]
mod tests;
