// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gt_core::role::Role;

#[yare::parameterized(
    create   = { "+", EventKind::Create },
    update   = { "→", EventKind::Update },
    complete = { "✓", EventKind::Complete },
    fail     = { "✗", EventKind::Fail },
    delete   = { "⊘", EventKind::Delete },
    pin      = { "📌", EventKind::Pin },
)]
fn symbols_map_to_kinds(symbol: &str, kind: EventKind) {
    let line = format!("[15:04:05] {symbol} gt-abc close · all done");
    let event = parse_activity_line(&line);
    assert_eq!(event.kind, kind);
    assert_eq!(event.time, "15:04:05");
    assert_eq!(event.id, "gt-abc");
    assert_eq!(event.action, "close");
    assert_eq!(event.message, "all done");
}

#[test]
fn message_is_optional() {
    let event = parse_activity_line("[15:04:05] + gt-abc create");
    assert_eq!(event.kind, EventKind::Create);
    assert_eq!(event.message, "");
}

#[test]
fn agent_ids_yield_an_actor() {
    let event = parse_activity_line("[09:00:00] ✓ gt-gastown-polecat-nux close · done");
    let actor = event.actor.unwrap();
    assert_eq!(actor.role, Role::Polecat);
    assert_eq!(actor.rig, "gastown");
    assert_eq!(actor.name, "nux");
}

#[test]
fn non_agent_ids_have_no_actor() {
    let event = parse_activity_line("[09:00:00] + gt-abc create");
    assert_eq!(event.actor, None);
}

#[yare::parameterized(
    garbage    = { "not an activity line" },
    bad_symbol = { "[09:00:00] ? gt-abc create" },
    empty      = { "" },
)]
fn unparseable_lines_fall_back_to_raw(line: &str) {
    let event = parse_activity_line(line);
    assert_eq!(event.kind, EventKind::Raw);
    assert_eq!(event.raw, line);
}

#[test]
fn ndjson_close_records_parse() {
    let record =
        parse_activity_record(r#"{"type": "status", "issue_id": "gt-leg-1", "new_status": "closed"}"#)
            .unwrap();
    assert!(record.is_close());
    assert_eq!(record.issue_id, "gt-leg-1");

    let open = parse_activity_record(r#"{"type": "status", "issue_id": "gt-leg-1", "new_status": "open"}"#)
        .unwrap();
    assert!(!open.is_close());
}

#[test]
fn ndjson_garbage_is_none() {
    assert_eq!(parse_activity_record("{broken"), None);
}
