// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gt_beads::{FakeRunner, Gateway};
use gt_core::FakeClock;
use gt_session::backend::SessionSpec;
use gt_session::FakeBackend;

const NOW_MS: u64 = 1_767_366_000_000; // 2026-01-02T15:00:00Z

fn fixture() -> (Gateway<FakeRunner>, FakeBackend, FakeClock, tempfile::TempDir) {
    let town = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(town.path().join(".beads")).unwrap();
    std::fs::write(town.path().join(".beads/.gt-types-ok"), "ok\n").unwrap();
    let clock = FakeClock::new();
    clock.set_epoch_ms(NOW_MS);
    (Gateway::new(FakeRunner::new(), town.path()), FakeBackend::new(), clock, town)
}

fn hooked_listing(id: &str, assignee: &str, updated_at: &str) -> String {
    serde_json::json!([{
        "id": id,
        "status": "hooked",
        "assignee": assignee,
        "updated_at": updated_at,
    }])
    .to_string()
}

#[tokio::test]
async fn old_hook_with_dead_session_goes_back_to_open() {
    let (gw, sessions, clock, town) = fixture();
    let townlog = TownLog::new(town.path());
    // Updated two hours ago, assignee session does not exist
    gw.runner().push_ok(hooked_listing(
        "gt-work-1",
        "gt-gastown-polecat-nux",
        "2026-01-02T13:00:00Z",
    ));

    let reclaimed = reclaim(&gw, &sessions, &clock, &townlog, 60).await.unwrap();
    assert_eq!(reclaimed, vec!["gt-work-1".to_string()]);

    let update = gw.runner_calls().last().unwrap().0.clone();
    assert_eq!(update, vec!["update", "gt-work-1", "--status", "open"]);
}

#[tokio::test]
async fn live_session_keeps_its_hook() {
    let (gw, sessions, clock, town) = fixture();
    let townlog = TownLog::new(town.path());
    sessions
        .create(&SessionSpec { name: "gt-gastown-nux".to_string(), ..Default::default() })
        .await
        .unwrap();
    gw.runner().push_ok(hooked_listing(
        "gt-work-1",
        "gt-gastown-polecat-nux",
        "2026-01-02T13:00:00Z",
    ));

    let reclaimed = reclaim(&gw, &sessions, &clock, &townlog, 60).await.unwrap();
    assert!(reclaimed.is_empty());
}

#[tokio::test]
async fn recent_hooks_are_untouched() {
    let (gw, sessions, clock, town) = fixture();
    let townlog = TownLog::new(town.path());
    gw.runner().push_ok(hooked_listing(
        "gt-work-1",
        "gt-gastown-polecat-nux",
        "2026-01-02T14:30:00Z", // 30 minutes old
    ));

    let reclaimed = reclaim(&gw, &sessions, &clock, &townlog, 60).await.unwrap();
    assert!(reclaimed.is_empty());
    // Only the listing ran
    assert_eq!(gw.runner_calls().len(), 1);
}

#[tokio::test]
async fn foreign_assignees_are_skipped() {
    let (gw, sessions, clock, town) = fixture();
    let townlog = TownLog::new(town.path());
    gw.runner().push_ok(hooked_listing("gt-work-1", "somebody", "2026-01-02T10:00:00Z"));

    let reclaimed = reclaim(&gw, &sessions, &clock, &townlog, 60).await.unwrap();
    assert!(reclaimed.is_empty());
}
