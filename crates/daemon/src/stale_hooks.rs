// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale-hook reclamation.
//!
//! A record sitting in status `hooked` belongs to some agent. When it has
//! not been touched for the configured age and the assignee's session no
//! longer exists, the work goes back to `open` for someone else to claim.

use gt_beads::gateway::{BeadsRunner, Gateway, UpdateSpec};
use gt_beads::record::status;
use gt_core::identity::Identity;
use gt_core::session_name::session_name;
use gt_core::Clock;
use gt_session::backend::SessionBackend;

use crate::error::DaemonError;
use crate::townlog::TownLog;

/// One reclamation sweep. Returns the IDs moved back to open.
pub async fn reclaim<R, B, C>(
    gw: &Gateway<R>,
    sessions: &B,
    clock: &C,
    townlog: &TownLog,
    max_age_minutes: u64,
) -> Result<Vec<String>, DaemonError>
where
    R: BeadsRunner,
    B: SessionBackend,
    C: Clock,
{
    let hooked = gw.list(&[], Some(status::HOOKED)).await?;
    let now_ms = clock.epoch_ms() as i64;
    let max_age_ms = (max_age_minutes * 60 * 1000) as i64;

    let mut reclaimed = Vec::new();
    for bead in &hooked {
        let Some(updated_at) = bead.updated_at else {
            continue;
        };
        let age_ms = now_ms - updated_at.timestamp_millis();
        if age_ms <= max_age_ms {
            continue;
        }

        // Assignee is an agent bead ID; unparseable assignees are not ours
        let Ok((_, identity)) = Identity::parse_bead_id(&bead.assignee) else {
            continue;
        };
        let prefix = gt_core::identity::extract_prefix(&bead.assignee).to_string();
        let session = session_name(&identity, &prefix);
        if sessions.exists(&session).await? {
            continue;
        }

        gw.update(
            &bead.id,
            &UpdateSpec { status: Some(status::OPEN.to_string()), ..Default::default() },
        )
        .await?;
        tracing::info!(bead = %bead.id, assignee = %bead.assignee, "reclaimed stale hook");
        townlog.append(
            "deacon",
            &format!("unhooked {} (assignee {} session gone)", bead.id, bead.assignee),
        );
        reclaimed.push(bead.id.clone());
    }
    Ok(reclaimed)
}

#[cfg(test)]
#[path = "stale_hooks_tests.rs"]
mod tests;
