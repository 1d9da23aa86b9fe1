// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testutil::fake_gateway;
use gt_beads::stores::channels::ChannelStatus;
use gt_core::FakeClock;

fn channel(count: u64, hours: u64) -> Channel {
    Channel {
        name: "alerts".to_string(),
        subscribers: vec![],
        status: ChannelStatus::Active,
        retention_count: count,
        retention_hours: hours,
        created_by: "mayor".to_string(),
        created_at: String::new(),
    }
}

/// Listing of open channel posts, oldest stamped earliest.
fn listing(n: usize) -> String {
    let posts: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("hq-msg-{i}"),
                "status": "open",
                "labels": ["gt:message", "channel:alerts"],
                "created_at": format!("2026-01-02T{:02}:00:00Z", i),
            })
        })
        .collect();
    serde_json::to_string(&posts).unwrap()
}

fn closed_ids(gw: &Gateway<gt_beads::FakeRunner>) -> Vec<String> {
    gw.runner_calls()
        .iter()
        .filter(|(a, _)| a[0] == "close")
        .map(|(a, _)| a[1].clone())
        .collect()
}

#[tokio::test]
async fn count_retention_closes_oldest_beyond_k() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(listing(5));

    let closed = enforce_retention(&gw, &FakeClock::new(), &channel(3, 0), false)
        .await
        .unwrap();

    assert_eq!(closed, 2);
    assert_eq!(closed_ids(&gw), vec!["hq-msg-0", "hq-msg-1"]);
}

#[tokio::test]
async fn count_within_limit_closes_nothing() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(listing(3));
    let closed = enforce_retention(&gw, &FakeClock::new(), &channel(3, 0), false)
        .await
        .unwrap();
    assert_eq!(closed, 0);
}

#[tokio::test]
async fn age_retention_closes_posts_past_cutoff() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(listing(5));

    // Posts are stamped 00:00..04:00 on 2026-01-02; with "now" at 06:00
    // and a 3h window, the 00:00, 01:00, and 02:00 posts age out.
    let clock = FakeClock::new();
    let now = chrono::DateTime::parse_from_rfc3339("2026-01-02T06:00:00Z").unwrap();
    clock.set_epoch_ms(now.timestamp_millis() as u64);

    let closed = enforce_retention(&gw, &clock, &channel(0, 3), false).await.unwrap();
    assert_eq!(closed, 3);
    assert_eq!(closed_ids(&gw), vec!["hq-msg-0", "hq-msg-1", "hq-msg-2"]);
}

#[tokio::test]
async fn patrol_buffer_tolerates_ten_percent_overage() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(listing(11));
    // Limit 10 with buffer becomes 11: nothing to close
    let closed = enforce_retention(&gw, &FakeClock::new(), &channel(10, 0), true)
        .await
        .unwrap();
    assert_eq!(closed, 0);

    // A 12th post exceeds even the buffered limit
    gw.runner().push_ok(listing(12));
    let closed = enforce_retention(&gw, &FakeClock::new(), &channel(10, 0), true)
        .await
        .unwrap();
    assert_eq!(closed, 1);
}

#[tokio::test]
async fn unlimited_channel_is_untouched() {
    let (gw, _dir) = fake_gateway();
    let closed = enforce_retention(&gw, &FakeClock::new(), &channel(0, 0), false)
        .await
        .unwrap();
    assert_eq!(closed, 0);
    // Not even a list call
    assert!(gw.runner_calls().is_empty());
}
