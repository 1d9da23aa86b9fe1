// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tail-follow over the town event log (`.events.jsonl`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{EventKind, EventSource, FeedEvent};

/// One line of `.events.jsonl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TownEvent {
    #[serde(default)]
    pub ts: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    /// `town` (everyone) or a narrower audience tag.
    #[serde(default)]
    pub visibility: Option<String>,
}

impl TownEvent {
    fn into_feed_event(self) -> FeedEvent {
        let kind = match self.event_type.as_str() {
            "create" => EventKind::Create,
            "complete" | "close" => EventKind::Complete,
            "fail" => EventKind::Fail,
            "delete" => EventKind::Delete,
            _ => EventKind::Update,
        };
        FeedEvent {
            kind,
            action: self.event_type.clone(),
            time: self.ts.clone(),
            message: self.message.clone(),
            actor: None,
            raw: String::new(),
            id: self.id,
        }
    }
}

/// Append a line to the town event log.
pub fn append_event(town: &Path, event: &TownEvent) -> std::io::Result<()> {
    use std::io::Write;
    let path = crate::paths::event_log(town);
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event).unwrap_or_default();
    writeln!(file, "{json}")
}

const POLL_INTERVAL_MS: u64 = 250;

/// Follows `.events.jsonl` from its current end, emitting lines whose
/// visibility passes the filter (`None` admits everything).
pub struct TailSource {
    rx: Option<mpsc::Receiver<FeedEvent>>,
    cancel: CancellationToken,
}

impl TailSource {
    pub fn spawn(town: &Path, visibility: Option<String>) -> Self {
        let path = crate::paths::event_log(town);
        let (tx, rx) = mpsc::channel(super::FAN_IN_DEPTH);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut offset = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = tokio::time::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS)) => {}
                }
                offset = drain_new_lines(&path, offset, &visibility, &tx).await;
                if tx.is_closed() {
                    break;
                }
            }
        });

        Self { rx: Some(rx), cancel }
    }
}

/// Read lines appended past `offset`, forward the admitted ones, and
/// return the new offset. Truncation rewinds to the start.
async fn drain_new_lines(
    path: &PathBuf,
    offset: u64,
    visibility: &Option<String>,
    tx: &mpsc::Sender<FeedEvent>,
) -> u64 {
    let len = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return offset,
    };
    let offset = if len < offset { 0 } else { offset };
    if len == offset {
        return offset;
    }

    let Ok(bytes) = std::fs::read(path) else {
        return offset;
    };
    let start = offset.min(bytes.len() as u64) as usize;
    let tail = String::from_utf8_lossy(&bytes[start..]).to_string();
    let consumed = bytes.len() as u64;

    for line in tail.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<TownEvent>(line) else {
            continue;
        };
        if let Some(ref wanted) = visibility {
            if event.visibility.as_deref().is_some_and(|v| v != wanted) {
                continue;
            }
        }
        let _ = tx.send(event.into_feed_event()).await;
    }
    consumed
}

impl EventSource for TailSource {
    fn take_events(&mut self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.rx.take()
    }

    fn close(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
