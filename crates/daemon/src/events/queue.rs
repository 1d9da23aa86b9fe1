// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue-lifecycle event source.
//!
//! Queue counters live in the store and have no push stream yet; this
//! placeholder keeps the fan-in shape stable until they do.

use tokio::sync::mpsc;

use super::{EventSource, FeedEvent};

pub struct QueueSource {
    rx: Option<mpsc::Receiver<FeedEvent>>,
}

impl QueueSource {
    pub fn new() -> Self {
        // Channel with no sender: drains immediately
        let (_tx, rx) = mpsc::channel(1);
        Self { rx: Some(rx) }
    }
}

impl Default for QueueSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for QueueSource {
    fn take_events(&mut self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.rx.take()
    }

    fn close(&self) {}
}
