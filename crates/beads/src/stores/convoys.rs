// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convoy completion checks.
//!
//! A convoy is a task record with `tracks` dependency edges to its legs.
//! It closes automatically, exactly once, when every tracked leg is
//! closed. The daemon's event tail drives the re-check on each close.

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, Gateway};
use crate::record::Bead;

/// Records that track the given leg (candidate convoys to re-check).
pub async fn tracking<R: BeadsRunner>(
    gw: &Gateway<R>,
    leg_id: &str,
) -> Result<Vec<Bead>, BeadsError> {
    let output = gw.run(&["dep", "tracking", leg_id, "--json"]).await?;
    if output.stdout.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(&output.stdout)
        .map_err(|source| BeadsError::Json { op: "dep tracking".into(), source })
}

/// Is every tracked leg of this convoy closed?
///
/// A convoy with no legs is not complete: an empty `tracks` list means the
/// legs have not been attached yet, not that they all finished.
pub async fn is_complete<R: BeadsRunner>(
    gw: &Gateway<R>,
    convoy: &Bead,
) -> Result<bool, BeadsError> {
    if convoy.tracks.is_empty() {
        return Ok(false);
    }
    for leg_id in &convoy.tracks {
        let leg = gw.show(leg_id).await?;
        if !leg.is_closed() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Close a completed convoy. Already-closed convoys are left alone so the
/// close happens exactly once even when multiple legs close in a burst.
pub async fn close_if_complete<R: BeadsRunner>(
    gw: &Gateway<R>,
    convoy_id: &str,
) -> Result<bool, BeadsError> {
    let convoy = gw.show(convoy_id).await?;
    if convoy.is_closed() {
        return Ok(false);
    }
    if !is_complete(gw, &convoy).await? {
        return Ok(false);
    }
    gw.close(convoy_id).await?;
    Ok(true)
}

#[cfg(test)]
#[path = "convoys_tests.rs"]
mod tests;
