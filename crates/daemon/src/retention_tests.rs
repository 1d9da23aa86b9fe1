// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gt_beads::{FakeRunner, Gateway};
use gt_core::FakeClock;

#[tokio::test]
async fn prunes_each_active_channel_with_buffer() {
    let town = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(town.path().join(".beads")).unwrap();
    std::fs::write(town.path().join(".beads/.gt-types-ok"), "ok\n").unwrap();
    let gw = Gateway::new(FakeRunner::new(), town.path());

    // Two channels: one with retention 2, one closed (skipped)
    let listing = serde_json::json!([
        {
            "id": "hq-channel-alerts",
            "description": "Channel alerts\n\nname: alerts\nstatus: active\nretention_count: 2\nretention_hours: 0\n",
        },
        {
            "id": "hq-channel-dead",
            "description": "Channel dead\n\nname: dead\nstatus: closed\nretention_count: 1\n",
        }
    ]);
    gw.runner().push_ok(listing.to_string());

    // alerts has 4 open posts; buffered limit is 2 + 0 = 2, so 2 close
    let posts = serde_json::json!([
        {"id": "hq-msg-0", "status": "open", "created_at": "2026-01-02T00:00:00Z"},
        {"id": "hq-msg-1", "status": "open", "created_at": "2026-01-02T01:00:00Z"},
        {"id": "hq-msg-2", "status": "open", "created_at": "2026-01-02T02:00:00Z"},
        {"id": "hq-msg-3", "status": "open", "created_at": "2026-01-02T03:00:00Z"},
    ]);
    gw.runner().push_ok(posts.to_string());

    let pruned = prune_channels(&gw, &FakeClock::new()).await.unwrap();
    assert_eq!(pruned, vec![("alerts".to_string(), 2)]);

    let closes: Vec<String> = gw
        .runner_calls()
        .iter()
        .filter(|(a, _)| a[0] == "close")
        .map(|(a, _)| a[1].clone())
        .collect();
    assert_eq!(closes, vec!["hq-msg-0", "hq-msg-1"]);
}
