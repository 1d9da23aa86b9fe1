// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The raw bead record as the store's `--json` output presents it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record in the external store.
///
/// Typed entities are views over this: labels mark the entity class, the
/// description carries the key:value envelope, and slots hold the few
/// fields that need indexable lookup (`hook`, `delegated_from`). Slots are
/// an index, not the truth; reconcile against the description when
/// precision matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bead {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, rename = "issue_type")]
    pub issue_type: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
    /// IDs this record tracks (convoy legs); populated by `--json` when
    /// dependency edges of type `tracks` exist.
    #[serde(default)]
    pub tracks: Vec<String>,
}

impl Bead {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.status == "open" || self.status == "hooked"
    }

    pub fn is_closed(&self) -> bool {
        self.status == "closed"
    }
}

/// Well-known labels.
pub mod labels {
    pub const AGENT: &str = "gt:agent";
    pub const CHANNEL: &str = "gt:channel";
    pub const GROUP: &str = "gt:group";
    pub const MESSAGE: &str = "gt:message";
    pub const ESCALATION: &str = "gt:escalation";
    pub const MERGE_REQUEST: &str = "gt:merge-request";
    pub const RIG: &str = "gt:rig";
    pub const ROLE: &str = "gt:role";
    pub const ACKED: &str = "acked";
    pub const RESOLVED: &str = "resolved";
    pub const REESCALATED: &str = "reescalated";

    pub fn severity(level: &str) -> String {
        format!("severity:{level}")
    }

    pub fn channel(name: &str) -> String {
        format!("channel:{name}")
    }
}

/// Well-known slots.
pub mod slots {
    pub const HOOK: &str = "hook";
    pub const DELEGATED_FROM: &str = "delegated_from";
    pub const AGENT_STATE: &str = "agent_state";
}

/// Record statuses the supervisor cares about.
pub mod status {
    pub const OPEN: &str = "open";
    pub const CLOSED: &str = "closed";
    pub const HOOKED: &str = "hooked";
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
