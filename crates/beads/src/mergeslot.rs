// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The merge slot: a cluster-wide single-writer latch per rig.
//!
//! One holder, an ordered waiter queue, FIFO hand-off on release. This is
//! the only place agents depend on cross-process ordering; everything else
//! tolerates reordering.

use gt_core::envelope::{format_envelope, parse_envelope};
use serde::{Deserialize, Serialize};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway, UpdateSpec};
use crate::record::Bead;

/// Observable state of a rig's merge slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    pub available: bool,
    pub holder: String,
    pub waiters: Vec<String>,
}

/// Handle for one rig's merge slot.
#[derive(Debug, Clone)]
pub struct MergeSlot {
    id: String,
    rig: String,
}

impl MergeSlot {
    pub fn for_rig(prefix: &str, rig: &str) -> Self {
        Self { id: format!("{prefix}-mergeslot"), rig: rig.to_string() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Create the slot record. Idempotent: an existing slot is left as-is.
    pub async fn create<R: BeadsRunner>(&self, gw: &Gateway<R>) -> Result<(), BeadsError> {
        let state = SlotState { available: true, ..Default::default() };
        let result = gw
            .create(&CreateSpec {
                id: self.id.clone(),
                title: format!("Merge slot for {}", self.rig),
                description: format_state(&self.rig, &state),
                issue_type: "task".to_string(),
                labels: vec![],
            })
            .await;
        match result {
            Ok(()) | Err(BeadsError::Duplicate(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn check<R: BeadsRunner>(&self, gw: &Gateway<R>) -> Result<SlotState, BeadsError> {
        Ok(parse_state(&gw.show(&self.id).await?))
    }

    /// Try to take the slot.
    ///
    /// On success the returned state shows the caller as holder. On
    /// contention the current state comes back, with the caller appended
    /// to the waiter queue when `add_waiter` is set.
    pub async fn acquire<R: BeadsRunner>(
        &self,
        gw: &Gateway<R>,
        holder: &str,
        add_waiter: bool,
    ) -> Result<SlotState, BeadsError> {
        let mut state = self.check(gw).await?;
        if state.holder.is_empty() {
            state.holder = holder.to_string();
            state.available = false;
            state.waiters.retain(|w| w != holder);
            self.save(gw, &state).await?;
            return Ok(state);
        }
        if state.holder == holder {
            return Ok(state);
        }
        if add_waiter && !state.waiters.iter().any(|w| w == holder) {
            state.waiters.push(holder.to_string());
            self.save(gw, &state).await?;
        }
        Ok(state)
    }

    /// Release the slot; only the holder may. Ownership passes to the head
    /// of the waiter queue.
    pub async fn release<R: BeadsRunner>(
        &self,
        gw: &Gateway<R>,
        holder: &str,
    ) -> Result<SlotState, BeadsError> {
        let mut state = self.check(gw).await?;
        if state.holder != holder {
            return Err(BeadsError::NotHolder {
                holder: state.holder.clone(),
                caller: holder.to_string(),
            });
        }
        if state.waiters.is_empty() {
            state.holder = String::new();
            state.available = true;
        } else {
            state.holder = state.waiters.remove(0);
            state.available = false;
        }
        self.save(gw, &state).await?;
        Ok(state)
    }

    async fn save<R: BeadsRunner>(
        &self,
        gw: &Gateway<R>,
        state: &SlotState,
    ) -> Result<(), BeadsError> {
        gw.update(
            &self.id,
            &UpdateSpec {
                description: Some(format_state(&self.rig, state)),
                ..Default::default()
            },
        )
        .await
    }
}

fn format_state(rig: &str, state: &SlotState) -> String {
    let waiters = state.waiters.join(",");
    format_envelope(
        &format!("Merge slot for {rig}"),
        &[
            ("holder", if state.holder.is_empty() { None } else { Some(state.holder.as_str()) }),
            ("waiters", if waiters.is_empty() { None } else { Some(&waiters) }),
        ],
    )
}

fn parse_state(bead: &Bead) -> SlotState {
    let env = parse_envelope(&bead.description);
    let holder = env.get("holder").to_string();
    SlotState {
        available: holder.is_empty(),
        holder,
        waiters: env
            .get("waiters")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

#[cfg(test)]
#[path = "mergeslot_tests.rs"]
mod tests;
