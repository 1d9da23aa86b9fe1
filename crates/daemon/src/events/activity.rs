// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity-stream parsing.
//!
//! Two shapes come out of the store's activity subcommand: the human feed
//! (`[HH:MM:SS] SYMBOL ID ACTION · MESSAGE`) parsed here for the display
//! feed, and `--json` NDJSON records used by the convoy watcher.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use gt_core::identity::Identity;

use super::{EventKind, EventSource, FeedEvent};

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // [15:04:05] ✓ gt-abc close · polecat done
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^\[(\d{2}:\d{2}:\d{2})\]\s+(\S+)\s+(\S+)\s+(\S+)(?:\s+·\s+(.*))?$").unwrap()
    })
}

fn kind_for_symbol(symbol: &str) -> Option<EventKind> {
    match symbol {
        "+" => Some(EventKind::Create),
        "→" => Some(EventKind::Update),
        "✓" => Some(EventKind::Complete),
        "✗" => Some(EventKind::Fail),
        "⊘" => Some(EventKind::Delete),
        "📌" => Some(EventKind::Pin),
        _ => None,
    }
}

/// Parse one activity feed line. Anything unrecognized becomes a raw
/// event rather than being dropped.
pub fn parse_activity_line(line: &str) -> FeedEvent {
    let Some(captures) = line_re().captures(line.trim_end()) else {
        return FeedEvent::raw_line(line);
    };
    let symbol = &captures[2];
    let Some(kind) = kind_for_symbol(symbol) else {
        return FeedEvent::raw_line(line);
    };
    let id = captures[3].to_string();
    let actor = Identity::parse_bead_id(&id).ok().map(|(_, identity)| identity);
    FeedEvent {
        kind,
        time: captures[1].to_string(),
        action: captures[4].to_string(),
        message: captures.get(5).map(|m| m.as_str().to_string()).unwrap_or_default(),
        id,
        actor,
        raw: line.to_string(),
    }
}

/// One NDJSON record from `bd activity --follow --json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub issue_id: String,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
}

impl ActivityRecord {
    /// Did this record close an issue?
    pub fn is_close(&self) -> bool {
        self.new_status.as_deref() == Some("closed")
    }
}

pub fn parse_activity_record(line: &str) -> Option<ActivityRecord> {
    serde_json::from_str(line.trim()).ok()
}

/// Feed source over the human activity stream of a spawned follower
/// process.
pub struct ActivitySource {
    rx: Option<mpsc::Receiver<FeedEvent>>,
    cancel: CancellationToken,
}

impl ActivitySource {
    /// Follow `bd activity --follow` in the town root.
    pub fn spawn(town_root: &std::path::Path) -> std::io::Result<Self> {
        let mut child = tokio::process::Command::new("bd")
            .args(["activity", "--follow"])
            .current_dir(town_root)
            .stdout(std::process::Stdio::piped())
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let (tx, rx) = mpsc::channel(super::FAN_IN_DEPTH);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let stdout = child.stdout.take();
        tokio::spawn(async move {
            let Some(stdout) = stdout else { return };
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    line = lines.next_line() => {
                        match line {
                            Ok(Some(line)) => {
                                if tx.send(parse_activity_line(&line)).await.is_err() {
                                    break;
                                }
                            }
                            Ok(None) => break,
                            Err(e) => {
                                tracing::warn!(error = %e, "activity stream read failed");
                                break;
                            }
                        }
                    }
                }
            }
            // kill_on_drop reaps the follower when the task ends
            drop(child);
        });

        Ok(Self { rx: Some(rx), cancel })
    }
}

impl EventSource for ActivitySource {
    fn take_events(&mut self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.rx.take()
    }

    fn close(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
