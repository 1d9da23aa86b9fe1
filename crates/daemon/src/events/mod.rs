// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sources and fan-in.
//!
//! Concrete sources (activity follow, event-log tail, queue placeholder)
//! feed bounded channels; `MultiSource` merges them, dropping on overflow
//! rather than blocking a producer. The feed filter then thins the merged
//! stream for display.

pub mod activity;
pub mod queue;
pub mod tail;

use std::collections::HashMap;

use gt_core::identity::Identity;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Merged-channel depth. Overflow drops events; the store remains the
/// source of truth, the feed is a view.
pub const FAN_IN_DEPTH: usize = 100;

/// Dedup window for rapid updates to the same record.
pub const DEDUP_WINDOW_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Create,
    Update,
    Complete,
    Fail,
    Delete,
    Pin,
    /// Unparseable line carried raw.
    Raw,
}

/// One event in the town feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub kind: EventKind,
    /// Record ID the event concerns (empty for raw lines).
    pub id: String,
    pub action: String,
    pub message: String,
    /// Wall-clock text as the source printed it.
    pub time: String,
    /// Actor parsed from the ID when it is an agent identity.
    pub actor: Option<Identity>,
    pub raw: String,
}

impl FeedEvent {
    pub fn raw_line(line: &str) -> Self {
        FeedEvent {
            kind: EventKind::Raw,
            id: String::new(),
            action: String::new(),
            message: String::new(),
            time: String::new(),
            actor: None,
            raw: line.to_string(),
        }
    }
}

/// One stream of feed events. `close` must be idempotent; `take_events`
/// yields the receiver exactly once.
pub trait EventSource: Send {
    fn take_events(&mut self) -> Option<mpsc::Receiver<FeedEvent>>;
    fn close(&self);
}

/// Fan-in over N sources: one bounded output channel, events dropped on
/// overflow, output closed when every source drains.
pub struct MultiSource {
    rx: Option<mpsc::Receiver<FeedEvent>>,
    cancel: CancellationToken,
}

impl MultiSource {
    pub fn new(mut sources: Vec<Box<dyn EventSource>>) -> Self {
        let (tx, rx) = mpsc::channel(FAN_IN_DEPTH);
        let cancel = CancellationToken::new();

        for mut source in sources.drain(..) {
            let Some(mut source_rx) = source.take_events() else {
                continue;
            };
            let tx = tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        event = source_rx.recv() => {
                            let Some(event) = event else { break };
                            if tx.try_send(event).is_err() {
                                tracing::debug!("feed fan-in full; dropping event");
                            }
                        }
                    }
                }
                source.close();
            });
        }
        // The forwarders hold the only senders: when all drain, rx closes.
        drop(tx);

        Self { rx: Some(rx), cancel }
    }
}

impl EventSource for MultiSource {
    fn take_events(&mut self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.rx.take()
    }

    fn close(&self) {
        self.cancel.cancel();
    }
}

/// Assemble the town's merged feed: the store's activity follower, the
/// event-log tail, and the queue placeholder, fanned into one channel.
pub fn town_feed(town: &std::path::Path) -> MultiSource {
    let mut sources: Vec<Box<dyn EventSource>> = Vec::new();
    match activity::ActivitySource::spawn(town) {
        Ok(source) => sources.push(Box::new(source)),
        Err(e) => tracing::warn!(error = %e, "activity follower unavailable; feed degraded"),
    }
    sources.push(Box::new(tail::TailSource::spawn(town, Some("town".to_string()))));
    sources.push(Box::new(queue::QueueSource::new()));
    MultiSource::new(sources)
}

/// Display thinning: drops update noise from agent-session records and
/// dedups rapid updates to the same record.
#[derive(Debug, Default)]
pub struct FeedFilter {
    last_update_ms: HashMap<String, u64>,
}

impl FeedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Should this event reach the feed?
    pub fn admit(&mut self, event: &FeedEvent, now_ms: u64) -> bool {
        if event.kind != EventKind::Update {
            return true;
        }
        // Agent-session records update constantly; the signal is in their
        // create/complete/fail/delete transitions.
        if event.actor.is_some() {
            return false;
        }
        match self.last_update_ms.get(&event.id) {
            Some(&prev) if now_ms.saturating_sub(prev) < DEDUP_WINDOW_MS => false,
            _ => {
                self.last_update_ms.insert(event.id.clone(), now_ms);
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
