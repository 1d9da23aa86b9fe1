// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt feed`: print the live town event feed.

use std::path::Path;

use anyhow::Result;

use gt_core::{Clock, SystemClock};
use gt_daemon::events::{town_feed, EventKind, EventSource, FeedFilter};

pub async fn run(town: &Path) -> Result<()> {
    let mut feed = town_feed(town);
    let Some(mut rx) = feed.take_events() else {
        return Ok(());
    };
    let mut filter = FeedFilter::new();
    let clock = SystemClock;

    while let Some(event) = rx.recv().await {
        if !filter.admit(&event, clock.epoch_ms()) {
            continue;
        }
        if event.kind == EventKind::Raw {
            println!("{}", event.raw);
            continue;
        }
        let actor = event
            .actor
            .as_ref()
            .map(|identity| format!(" [{identity}]"))
            .unwrap_or_default();
        println!("{} {:?} {}{} {}", event.time, event.kind, event.id, actor, event.message);
    }
    feed.close();
    Ok(())
}
