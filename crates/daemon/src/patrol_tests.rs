// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[test]
fn pause_sentinel_stops_every_patrol() {
    let town = tempfile::tempdir().unwrap();
    let config = DaemonConfig::default();
    assert!(patrol_runnable(town.path(), &config, names::DEACON));

    let sentinel = paths::paused_sentinel(town.path());
    std::fs::create_dir_all(sentinel.parent().unwrap()).unwrap();
    std::fs::write(&sentinel, "{}").unwrap();
    assert!(!patrol_runnable(town.path(), &config, names::DEACON));
    assert!(!patrol_runnable(town.path(), &config, names::RETENTION));
}

#[test]
fn disabled_patrols_do_not_run() {
    let town = tempfile::tempdir().unwrap();
    let config: DaemonConfig =
        serde_json::from_str(r#"{"patrols": {"witness": false}}"#).unwrap();
    assert!(!patrol_runnable(town.path(), &config, names::WITNESS));
    assert!(patrol_runnable(town.path(), &config, names::REFINERY));
}

#[test]
fn heartbeat_accumulates_cycles() {
    let town = tempfile::tempdir().unwrap();
    record_patrol_run(town.path(), names::RETENTION);
    record_patrol_run(town.path(), names::RETENTION);
    record_patrol_run(town.path(), names::DEACON);

    let heartbeat = HeartbeatFile::load(town.path());
    assert_eq!(heartbeat.cycles.get(names::RETENTION), Some(&2));
    assert_eq!(heartbeat.cycles.get(names::DEACON), Some(&1));
    assert!(heartbeat.last_run.contains_key(names::RETENTION));
}

#[tokio::test(start_paused = true)]
async fn patrol_loop_ticks_and_survives_failures() {
    let town = tempfile::tempdir().unwrap();
    let config = DaemonConfig::default();
    let cancel = CancellationToken::new();
    let runs = Arc::new(AtomicU32::new(0));

    let loop_runs = runs.clone();
    let loop_cancel = cancel.clone();
    let town_path = town.path().to_path_buf();
    let handle = tokio::spawn(async move {
        run_patrol_loop(
            names::RETENTION,
            Duration::from_secs(60),
            &town_path,
            &config,
            loop_cancel,
            move || {
                let runs = loop_runs.clone();
                async move {
                    let n = runs.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        // First pass fails; the loop must keep going
                        Err(DaemonError::PidLocked("boom".to_string()))
                    } else {
                        Ok(())
                    }
                }
            },
        )
        .await;
    });

    tokio::time::sleep(Duration::from_secs(125)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    // Both passes count as completed cycles, failure included
    let heartbeat = HeartbeatFile::load(town.path());
    assert_eq!(heartbeat.cycles.get(names::RETENTION), Some(&2));
}
