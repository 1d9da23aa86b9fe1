// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn event(event_type: &str, id: &str, visibility: Option<&str>) -> TownEvent {
    TownEvent {
        ts: "2026-01-02T15:04:05Z".to_string(),
        event_type: event_type.to_string(),
        id: id.to_string(),
        message: String::new(),
        visibility: visibility.map(str::to_string),
    }
}

async fn recv_with_timeout(rx: &mut tokio::sync::mpsc::Receiver<FeedEvent>) -> FeedEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for tail event")
        .expect("tail closed early")
}

#[tokio::test]
async fn tail_emits_only_lines_appended_after_start() {
    let town = tempfile::tempdir().unwrap();
    append_event(town.path(), &event("create", "gt-old", None)).unwrap();

    let mut source = TailSource::spawn(town.path(), None);
    let mut rx = source.take_events().unwrap();

    // Give the tail a beat to record its starting offset
    tokio::time::sleep(Duration::from_millis(400)).await;
    append_event(town.path(), &event("complete", "gt-new", None)).unwrap();

    let seen = recv_with_timeout(&mut rx).await;
    assert_eq!(seen.id, "gt-new");
    assert_eq!(seen.kind, EventKind::Complete);
    source.close();
}

#[tokio::test]
async fn visibility_filter_drops_foreign_events() {
    let town = tempfile::tempdir().unwrap();
    std::fs::write(crate::paths::event_log(town.path()), "").unwrap();

    let mut source = TailSource::spawn(town.path(), Some("town".to_string()));
    let mut rx = source.take_events().unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    append_event(town.path(), &event("create", "gt-hidden", Some("deacon"))).unwrap();
    append_event(town.path(), &event("create", "gt-shown", Some("town"))).unwrap();
    append_event(town.path(), &event("create", "gt-untagged", None)).unwrap();

    let first = recv_with_timeout(&mut rx).await;
    assert_eq!(first.id, "gt-shown");
    // Untagged events pass any filter
    let second = recv_with_timeout(&mut rx).await;
    assert_eq!(second.id, "gt-untagged");
    source.close();
}

#[test]
fn town_event_json_roundtrip() {
    let e = event("close", "gt-convoy-1", Some("town"));
    let json = serde_json::to_string(&e).unwrap();
    let parsed: TownEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, e);
}
