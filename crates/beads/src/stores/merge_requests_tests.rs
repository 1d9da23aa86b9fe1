// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::stores::test_support::fake_gateway;

#[test]
fn preamble_roundtrips() {
    let mr = MergeRequest {
        id: "gt-mr-1".to_string(),
        branch: "polecat/nux-gastown-1735000000000".to_string(),
        target: "main".to_string(),
        body: "Ready for review.".to_string(),
    };
    let bead = Bead {
        id: mr.id.clone(),
        description: format_description(&mr),
        ..Default::default()
    };
    assert_eq!(parse(&bead), mr);
}

#[test]
fn preamble_without_body() {
    let bead = Bead {
        id: "gt-mr-2".to_string(),
        description: "branch: fix/thing\ntarget: main\n".to_string(),
        ..Default::default()
    };
    let mr = parse(&bead);
    assert_eq!(mr.branch, "fix/thing");
    assert_eq!(mr.target, "main");
    assert_eq!(mr.body, "");
}

#[test]
fn branch_line_in_body_is_not_index() {
    let bead = Bead {
        id: "gt-mr-3".to_string(),
        description: "branch: real\ntarget: main\n\nbranch: decoy\n".to_string(),
        ..Default::default()
    };
    assert_eq!(parse(&bead).branch, "real");
}

#[tokio::test]
async fn find_for_branch_scans_open_mrs() {
    let (gw, _dir) = fake_gateway();
    let listing = serde_json::json!([
        {"id": "gt-mr-1", "description": "branch: a\ntarget: main\n", "status": "open"},
        {"id": "gt-mr-2", "description": "branch: b\ntarget: main\n", "status": "open"},
    ]);
    gw.runner().push_ok(listing.to_string());

    let found = find_for_branch(&gw, "b").await.unwrap();
    assert_eq!(found.map(|mr| mr.id), Some("gt-mr-2".to_string()));

    let args = &gw.runner_calls()[0].0;
    assert!(args.contains(&"gt:merge-request".to_string()));
    assert!(args.contains(&"open".to_string()));
}
