// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convoy completion driven by the activity tail.
//!
//! Every `status → closed` record triggers a re-check of the convoys
//! tracking that leg; a convoy whose legs are all closed is closed
//! exactly once and the close is published to the town event log.

use std::path::Path;

use gt_beads::gateway::{BeadsRunner, Gateway};
use gt_beads::stores::convoys;

use crate::error::DaemonError;
use crate::events::activity::ActivityRecord;
use crate::events::tail::{append_event, TownEvent};
use crate::townlog::TownLog;

/// Handle one activity record; returns the convoys closed by it.
pub async fn handle_activity_record<R: BeadsRunner>(
    gw: &Gateway<R>,
    town: &Path,
    townlog: &TownLog,
    record: &ActivityRecord,
) -> Result<Vec<String>, DaemonError> {
    if !record.is_close() || record.issue_id.is_empty() {
        return Ok(vec![]);
    }

    publish_close(town, &record.issue_id, "");

    let mut closed = Vec::new();
    for convoy in convoys::tracking(gw, &record.issue_id).await? {
        if convoys::close_if_complete(gw, &convoy.id).await? {
            tracing::info!(convoy = %convoy.id, leg = %record.issue_id, "convoy complete");
            townlog.append("convoy", &format!("closed {} (last leg {})", convoy.id, record.issue_id));
            publish_close(town, &convoy.id, "convoy complete");
            closed.push(convoy.id);
        }
    }
    Ok(closed)
}

/// Consume NDJSON activity lines until the channel drains or cancellation.
/// Per-line failures log and continue.
pub async fn run_activity_tail<R: BeadsRunner>(
    gw: &Gateway<R>,
    town: &Path,
    townlog: &TownLog,
    cancel: tokio_util::sync::CancellationToken,
    mut lines: tokio::sync::mpsc::Receiver<String>,
) {
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };
        let Some(record) = crate::events::activity::parse_activity_record(&line) else {
            continue;
        };
        if let Err(e) = handle_activity_record(gw, town, townlog, &record).await {
            tracing::warn!(error = %e, "activity record handling failed");
        }
    }
}

fn publish_close(town: &Path, id: &str, message: &str) {
    let event = TownEvent {
        ts: chrono::Utc::now().to_rfc3339(),
        event_type: "close".to_string(),
        id: id.to_string(),
        message: message.to_string(),
        visibility: Some("town".to_string()),
    };
    if let Err(e) = append_event(town, &event) {
        tracing::warn!(error = %e, "failed to append close event");
    }
}

#[cfg(test)]
#[path = "convoy_tests.rs"]
mod tests;
