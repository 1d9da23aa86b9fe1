// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel retention enforcement.
//!
//! Runs on every post (exact limits) and from the retention patrol (with a
//! 10% count buffer so the patrol does not thrash the store re-closing
//! around the boundary). Age pruning runs first, then count pruning over
//! whatever is still open; ordering is oldest-first so the newest K
//! survive.

use chrono::{Duration as ChronoDuration, TimeZone, Utc};

use gt_beads::gateway::{BeadsRunner, Gateway};
use gt_beads::record::{labels, Bead};
use gt_beads::stores::channels::Channel;
use gt_core::Clock;

use crate::error::MailError;

/// Close channel posts past the channel's retention limits. Returns how
/// many posts were closed.
pub async fn enforce_retention<R: BeadsRunner, C: Clock>(
    gw: &Gateway<R>,
    clock: &C,
    channel: &Channel,
    with_buffer: bool,
) -> Result<u64, MailError> {
    if channel.retention_count == 0 && channel.retention_hours == 0 {
        return Ok(0);
    }

    let label = labels::channel(&channel.name);
    let mut posts: Vec<Bead> = gw.list(&[&label], Some("open")).await?;
    posts.sort_by_key(|b| b.created_at);

    let mut closed = 0u64;

    if channel.retention_hours > 0 {
        let now_ms = clock.epoch_ms() as i64;
        let now = Utc.timestamp_millis_opt(now_ms).single().unwrap_or_else(Utc::now);
        let cutoff = now - ChronoDuration::hours(channel.retention_hours as i64);
        for post in &posts {
            if post.created_at.is_some_and(|t| t < cutoff) {
                gw.close(&post.id).await?;
                closed += 1;
            }
        }
        posts.retain(|p| !p.created_at.is_some_and(|t| t < cutoff));
    }

    if channel.retention_count > 0 {
        let limit = if with_buffer {
            channel.retention_count + channel.retention_count / 10
        } else {
            channel.retention_count
        };
        let limit = limit as usize;
        if posts.len() > limit {
            let excess = posts.len() - limit;
            for post in posts.iter().take(excess) {
                gw.close(&post.id).await?;
                closed += 1;
            }
        }
    }

    Ok(closed)
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
