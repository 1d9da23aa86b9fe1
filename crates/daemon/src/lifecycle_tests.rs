// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gt_beads::{FakeRunner, Gateway};
use gt_core::config::RigEntry;
use gt_core::FakeClock;
use gt_mail::MessageDraft;
use gt_session::FakeBackend;
use std::sync::Arc;

fn rigs() -> RigsConfig {
    RigsConfig {
        rigs: [(
            "gastown".to_string(),
            RigEntry {
                git_url: "https://example.com/g.git".to_string(),
                prefix: "gt".to_string(),
                default_branch: None,
            },
        )]
        .into(),
    }
}

#[test]
fn request_files_roundtrip_and_drain() {
    let town = tempfile::tempdir().unwrap();
    write_request(town.path(), "", LifecycleAction::Shutdown).unwrap();
    write_request(town.path(), "gastown/polecats/nux", LifecycleAction::Cycle).unwrap();

    let requests = take_requests(town.path());
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().any(|r| r.from.is_empty() && r.action == LifecycleAction::Shutdown));
    assert!(requests.iter().any(|r| r.from == "gastown/polecats/nux"));

    // Drained: a second take finds nothing
    assert!(take_requests(town.path()).is_empty());
}

#[tokio::test]
async fn empty_from_means_daemon_shutdown() {
    let town = tempfile::tempdir().unwrap();
    let sessions = FakeBackend::new();
    let req = LifecycleRequest { from: String::new(), action: LifecycleAction::Shutdown, timestamp: None };
    let applied =
        apply(&sessions, &RoleTable::embedded(), &rigs(), town.path(), &req).await.unwrap();
    assert_eq!(applied, Applied::DaemonShutdown);
}

#[tokio::test]
async fn shutdown_kills_the_senders_session() {
    let town = tempfile::tempdir().unwrap();
    let sessions = FakeBackend::new();
    sessions
        .create(&SessionSpec { name: "gt-gastown-nux".to_string(), ..Default::default() })
        .await
        .unwrap();

    let req = LifecycleRequest {
        from: "gastown/polecats/nux".to_string(),
        action: LifecycleAction::Shutdown,
        timestamp: None,
    };
    let applied =
        apply(&sessions, &RoleTable::embedded(), &rigs(), town.path(), &req).await.unwrap();
    assert_eq!(applied, Applied::SessionKilled("gt-gastown-nux".to_string()));
    assert!(sessions.session("gt-gastown-nux").is_none());
}

#[tokio::test]
async fn restart_recreates_with_restart_beacon() {
    let town = tempfile::tempdir().unwrap();
    let sessions = FakeBackend::new();
    sessions
        .create(&SessionSpec { name: "gt-gastown-nux".to_string(), ..Default::default() })
        .await
        .unwrap();

    let req = LifecycleRequest {
        from: "gastown/polecats/nux".to_string(),
        action: LifecycleAction::Restart,
        timestamp: None,
    };
    let applied =
        apply(&sessions, &RoleTable::embedded(), &rigs(), town.path(), &req).await.unwrap();
    assert_eq!(applied, Applied::SessionRestarted("gt-gastown-nux".to_string()));

    let inputs = sessions.inputs("gt-gastown-nux");
    assert_eq!(inputs.len(), 1);
    assert!(inputs[0].contains(":: restart"));
    // Bare restart carries no instruction line
    assert_eq!(inputs[0].lines().count(), 1);
}

#[tokio::test]
async fn cycle_recreates_with_start_beacon() {
    let town = tempfile::tempdir().unwrap();
    let sessions = FakeBackend::new();
    let req = LifecycleRequest {
        from: "deacon".to_string(),
        action: LifecycleAction::Cycle,
        timestamp: None,
    };
    let applied =
        apply(&sessions, &RoleTable::embedded(), &rigs(), town.path(), &req).await.unwrap();
    assert_eq!(applied, Applied::SessionRestarted("hq-deacon".to_string()));
    assert!(sessions.inputs("hq-deacon")[0].contains(":: start"));
}

#[tokio::test]
async fn inbox_yields_requests_and_archives() {
    let town = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(town.path().join(".beads")).unwrap();
    std::fs::write(town.path().join(".beads/.gt-types-ok"), "ok\n").unwrap();
    let gw = Arc::new(Gateway::new(FakeRunner::new(), town.path()));
    let mailroom = Mailroom::new(gw.clone(), FakeClock::new());

    let listing = serde_json::json!([
        {
            "id": "hq-msg-1",
            "title": "lifecycle",
            "description": "lifecycle\n\nfrom: gastown/polecats/nux\nto: deacon\n\n{\"action\": \"cycle\"}\n",
            "status": "open",
        },
        {
            "id": "hq-msg-2",
            "title": "lunch plans",
            "description": "lunch plans\n\nfrom: mayor\nto: deacon\n\nnoon?\n",
            "status": "open",
        }
    ]);
    gw.runner().push_ok(listing.to_string());

    let requests = poll_inbox(&mailroom, "deacon").await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].from, "gastown/polecats/nux");
    assert_eq!(requests[0].action, LifecycleAction::Cycle);

    // Only the lifecycle message was archived
    let closes: Vec<String> = gw
        .runner_calls()
        .iter()
        .filter(|(a, _)| a[0] == "close")
        .map(|(a, _)| a[1].clone())
        .collect();
    assert_eq!(closes, vec!["hq-msg-1"]);
}
