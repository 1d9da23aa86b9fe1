// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_store_json_with_missing_fields() {
    let json = r#"{"id": "gt-abc", "title": "Fix parser", "status": "open"}"#;
    let bead: Bead = serde_json::from_str(json).unwrap();
    assert_eq!(bead.id, "gt-abc");
    assert_eq!(bead.title, "Fix parser");
    assert!(bead.labels.is_empty());
    assert!(bead.slots.is_empty());
    assert!(bead.is_open());
    assert!(!bead.is_closed());
}

#[test]
fn parses_timestamps_and_slots() {
    let json = r#"{
        "id": "gt-gastown-polecat-nux",
        "status": "hooked",
        "labels": ["gt:agent"],
        "updated_at": "2026-01-02T15:04:05Z",
        "slots": {"hook": "gt-work-1"}
    }"#;
    let bead: Bead = serde_json::from_str(json).unwrap();
    assert!(bead.has_label(labels::AGENT));
    assert_eq!(bead.slot(slots::HOOK), Some("gt-work-1"));
    assert!(bead.updated_at.is_some());
    assert!(bead.is_open()); // hooked counts as open work
}

#[test]
fn label_helpers() {
    assert_eq!(labels::severity("high"), "severity:high");
    assert_eq!(labels::channel("alerts"), "channel:alerts");
}
