// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::stores::test_support::fake_gateway;

fn convoy_bead(status: &str, tracks: &[&str]) -> String {
    serde_json::json!({
        "id": "gt-convoy-1",
        "status": status,
        "issue_type": "task",
        "tracks": tracks,
    })
    .to_string()
}

fn leg_bead(id: &str, status: &str) -> String {
    serde_json::json!({"id": id, "status": status}).to_string()
}

#[tokio::test]
async fn open_leg_keeps_convoy_open() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(convoy_bead("open", &["gt-leg-1", "gt-leg-2"]));
    gw.runner().push_ok(leg_bead("gt-leg-1", "closed"));
    gw.runner().push_ok(leg_bead("gt-leg-2", "open"));

    let closed = close_if_complete(&gw, "gt-convoy-1").await.unwrap();
    assert!(!closed);
    assert!(gw.runner_calls().iter().all(|(a, _)| a[0] != "close"));
}

#[tokio::test]
async fn all_legs_closed_closes_convoy() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(convoy_bead("open", &["gt-leg-1", "gt-leg-2"]));
    gw.runner().push_ok(leg_bead("gt-leg-1", "closed"));
    gw.runner().push_ok(leg_bead("gt-leg-2", "closed"));

    let closed = close_if_complete(&gw, "gt-convoy-1").await.unwrap();
    assert!(closed);
    let last = gw.runner_calls().last().unwrap().0.clone();
    assert_eq!(last, vec!["close", "gt-convoy-1"]);
}

#[tokio::test]
async fn already_closed_convoy_is_left_alone() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(convoy_bead("closed", &["gt-leg-1"]));

    let closed = close_if_complete(&gw, "gt-convoy-1").await.unwrap();
    assert!(!closed);
    assert_eq!(gw.runner_calls().len(), 1);
}

#[tokio::test]
async fn leg_less_convoy_is_not_complete() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(convoy_bead("open", &[]));
    let closed = close_if_complete(&gw, "gt-convoy-1").await.unwrap();
    assert!(!closed);
}

#[tokio::test]
async fn tracking_parses_listing() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_ok(r#"[{"id": "gt-convoy-1", "tracks": ["gt-leg-1"]}]"#);
    let convoys = tracking(&gw, "gt-leg-1").await.unwrap();
    assert_eq!(convoys.len(), 1);
    assert_eq!(convoys[0].tracks, vec!["gt-leg-1".to_string()]);
}
