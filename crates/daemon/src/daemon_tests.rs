// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gt_beads::{FakeRunner, Gateway};
use gt_core::config::RigEntry;
use gt_core::FakeClock;
use gt_mail::LifecycleAction;
use gt_session::backend::SessionSpec;
use gt_session::FakeBackend;
use tempfile::TempDir;

fn town() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".beads")).unwrap();
    std::fs::write(dir.path().join(".beads/.gt-types-ok"), "ok\n").unwrap();
    dir
}

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

async fn with_session(sessions: &FakeBackend, name: &str) {
    sessions
        .create(&SessionSpec { name: name.to_string(), ..Default::default() })
        .await
        .unwrap();
}

#[tokio::test]
async fn monitored_sessions_exclude_mayor_and_boot() {
    let sessions = FakeBackend::new();
    for name in ["hq-mayor", "hq-deacon", "gt-boot", "gt-gastown-nux", "unrelated"] {
        with_session(&sessions, name).await;
    }
    let monitored = monitored_sessions(&sessions, &["gastown".to_string()]).await.unwrap();
    assert_eq!(monitored, vec!["gt-gastown-nux".to_string(), "hq-deacon".to_string()]);
}

#[tokio::test]
async fn witness_patrol_nudges_once_per_window() {
    let dir = town();
    let gw = Gateway::new(FakeRunner::new(), dir.path());
    let sessions = FakeBackend::new();
    let clock = FakeClock::new();
    let slots = SlotStore::new(
        dir.path().join(".runtime/notifications"),
        SlotStore::<FakeClock>::DEFAULT_MAX_AGE,
        clock.clone(),
    );
    with_session(&sessions, "gt-gastown-witness").await;

    let done_polecat = serde_json::json!([{
        "id": "gt-gastown-polecat-nux",
        "labels": ["gt:agent"],
        "description": "Agent gt-gastown-polecat-nux (polecat)\n\nrole_type: polecat\nrig: gastown\nagent_state: done\n",
        "status": "open",
    }]);
    gw.runner().push_ok(done_polecat.to_string());

    let nudged = witness_patrol(&gw, &sessions, &slots, &rigs()).await.unwrap();
    assert_eq!(nudged, vec!["gt-gastown-witness".to_string()]);
    let inputs = sessions.inputs("gt-gastown-witness");
    assert!(inputs[0].contains("gt-gastown-polecat-nux"));

    // Same state on the next pass: slot still pending, no second nudge
    gw.runner().push_ok(done_polecat.to_string());
    let nudged = witness_patrol(&gw, &sessions, &slots, &rigs()).await.unwrap();
    assert!(nudged.is_empty());
    assert_eq!(sessions.inputs("gt-gastown-witness").len(), 1);
}

#[tokio::test]
async fn witness_patrol_ignores_working_polecats() {
    let dir = town();
    let gw = Gateway::new(FakeRunner::new(), dir.path());
    let sessions = FakeBackend::new();
    let slots = SlotStore::new(
        dir.path().join(".runtime/notifications"),
        SlotStore::<FakeClock>::DEFAULT_MAX_AGE,
        FakeClock::new(),
    );
    with_session(&sessions, "gt-gastown-witness").await;

    gw.runner().push_ok(
        serde_json::json!([{
            "id": "gt-gastown-polecat-nux",
            "labels": ["gt:agent"],
            "description": "Agent\n\nrole_type: polecat\nrig: gastown\nagent_state: working\n",
            "status": "open",
        }])
        .to_string(),
    );

    let nudged = witness_patrol(&gw, &sessions, &slots, &rigs()).await.unwrap();
    assert!(nudged.is_empty());
}

#[tokio::test]
async fn refinery_patrol_ensures_slot_and_nudges_on_open_mrs() {
    let dir = town();
    let gw = Gateway::new(FakeRunner::new(), dir.path());
    let sessions = FakeBackend::new();
    let slots = SlotStore::new(
        dir.path().join(".runtime/notifications"),
        SlotStore::<FakeClock>::DEFAULT_MAX_AGE,
        FakeClock::new(),
    );
    with_session(&sessions, "gt-gastown-refinery").await;

    gw.runner().push_ok(
        serde_json::json!([{
            "id": "gt-mr-1",
            "labels": ["gt:merge-request"],
            "description": "branch: polecat/nux-gastown-17\ntarget: main\n",
            "status": "open",
        }])
        .to_string(),
    );

    let nudged = refinery_patrol(&gw, &sessions, &slots, &rigs()).await.unwrap();
    assert_eq!(nudged, vec!["gt-gastown-refinery".to_string()]);

    // The merge slot create ran (idempotent) before any nudge
    let creates: Vec<Vec<String>> = gw
        .runner_calls()
        .iter()
        .filter(|(a, _)| a[0] == "create")
        .map(|(a, _)| a.clone())
        .collect();
    assert!(creates.iter().any(|args| args.contains(&"gt-mergeslot".to_string())));

    let inputs = sessions.inputs("gt-gastown-refinery");
    assert!(inputs[0].contains("polecat/nux-gastown-17"));
}

#[tokio::test]
async fn daemon_runs_until_shutdown_request() {
    let dir = town();
    let gw = Arc::new(Gateway::new(FakeRunner::new(), dir.path()));
    let sessions = FakeBackend::new();
    let clock = FakeClock::new();

    let daemon = Daemon::new(
        DaemonDeps {
            gw,
            sessions,
            clock,
            town_root: dir.path().to_path_buf(),
        },
        DaemonConfig::default(),
        rigs(),
        RoleTable::embedded(),
    );

    let town_path = dir.path().to_path_buf();
    let run = tokio::spawn(async move { daemon.run().await });

    // Let the daemon come up, then ask it to stop via the request file
    tokio::time::sleep(Duration::from_millis(300)).await;
    let state = DaemonState::load(&town_path).unwrap().unwrap();
    assert!(state.running);
    assert_eq!(PidFile::read(&town_path), Some(std::process::id()));

    crate::lifecycle::write_request(&town_path, "", LifecycleAction::Shutdown).unwrap();

    tokio::time::timeout(Duration::from_secs(10), run).await.unwrap().unwrap().unwrap();

    let state = DaemonState::load(&town_path).unwrap().unwrap();
    assert!(!state.running);
    assert_eq!(PidFile::read(&town_path), None);
    let log = std::fs::read_to_string(town_path.join("logs/town.log")).unwrap();
    assert!(log.contains("started"));
    assert!(log.contains("stopped"));
}
