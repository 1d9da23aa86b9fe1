// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delegations: parent/child work links.
//!
//! A delegation is JSON in the child record's `delegated_from` slot plus a
//! hard dependency edge child → parent. The pair is installed and removed
//! together; the slot alone is never authoritative for scheduling.

use serde::{Deserialize, Serialize};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, Gateway};
use crate::record::slots;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub parent: String,
    pub child: String,
    pub delegator: String,
    pub delegatee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

/// Install the delegation: slot on the child plus the dependency edge.
pub async fn add<R: BeadsRunner>(gw: &Gateway<R>, d: &Delegation) -> Result<(), BeadsError> {
    let json = serde_json::to_string(d)
        .map_err(|source| BeadsError::Json { op: "delegation".into(), source })?;
    gw.set_slot(&d.child, slots::DELEGATED_FROM, &json).await?;
    gw.dep_add(&d.child, &d.parent, "hard").await
}

/// Read the delegation recorded on a child, if any.
pub async fn get<R: BeadsRunner>(
    gw: &Gateway<R>,
    child: &str,
) -> Result<Option<Delegation>, BeadsError> {
    let bead = gw.show(child).await?;
    let Some(json) = bead.slot(slots::DELEGATED_FROM) else {
        return Ok(None);
    };
    if json.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(json)
        .map(Some)
        .map_err(|source| BeadsError::Json { op: "delegation".into(), source })
}

/// Remove the delegation and its dependency edge. No-op when absent.
pub async fn remove<R: BeadsRunner>(gw: &Gateway<R>, child: &str) -> Result<(), BeadsError> {
    let Some(d) = get(gw, child).await? else {
        return Ok(());
    };
    gw.clear_slot(child, slots::DELEGATED_FROM).await?;
    gw.dep_remove(child, &d.parent).await
}

#[cfg(test)]
#[path = "delegations_tests.rs"]
mod tests;
