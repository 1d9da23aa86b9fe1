// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The retention pruner patrol.
//!
//! Channels enforce retention on write; this patrol is the backstop for
//! channels that stopped receiving posts. It runs with a 10% count buffer
//! so the patrol and the write path do not thrash around the boundary.

use gt_beads::gateway::{BeadsRunner, Gateway};
use gt_beads::stores::channels::{self, ChannelStatus};
use gt_core::Clock;
use gt_mail::channel::enforce_retention;

use crate::error::DaemonError;

/// Prune every active channel. Returns (channel, closed-count) pairs for
/// channels that had anything to close. Per-channel failures log and
/// continue; a patrol never halts on one bad channel.
pub async fn prune_channels<R: BeadsRunner, C: Clock>(
    gw: &Gateway<R>,
    clock: &C,
) -> Result<Vec<(String, u64)>, DaemonError> {
    let mut pruned = Vec::new();
    for channel in channels::list(gw).await? {
        if channel.status == ChannelStatus::Closed {
            continue;
        }
        match enforce_retention(gw, clock, &channel, true).await {
            Ok(0) => {}
            Ok(closed) => {
                tracing::info!(channel = %channel.name, closed, "retention pruned channel");
                pruned.push((channel.name.clone(), closed));
            }
            Err(e) => {
                tracing::warn!(channel = %channel.name, error = %e, "retention pruning failed");
            }
        }
    }
    Ok(pruned)
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
