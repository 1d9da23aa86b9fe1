// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::record::Bead;
use crate::stores::test_support::fake_gateway;

fn delegation() -> Delegation {
    Delegation {
        parent: "gt-epic-1".to_string(),
        child: "gt-leg-1".to_string(),
        delegator: "mayor".to_string(),
        delegatee: "gastown/polecats/nux".to_string(),
        terms: Some("land by friday".to_string()),
    }
}

#[tokio::test]
async fn add_sets_slot_and_hard_edge() {
    let (gw, _dir) = fake_gateway();
    add(&gw, &delegation()).await.unwrap();

    let calls = gw.runner_calls();
    assert_eq!(calls[0].0[..4], ["slot", "set", "gt-leg-1", "delegated_from"]);
    let stored: Delegation = serde_json::from_str(&calls[0].0[4]).unwrap();
    assert_eq!(stored, delegation());
    assert_eq!(
        calls[1].0,
        vec!["dep", "add", "gt-leg-1", "gt-epic-1", "--type", "hard"]
    );
}

#[tokio::test]
async fn remove_clears_slot_and_edge() {
    let (gw, _dir) = fake_gateway();
    let bead = Bead {
        id: "gt-leg-1".to_string(),
        slots: [(
            "delegated_from".to_string(),
            serde_json::to_string(&delegation()).unwrap(),
        )]
        .into(),
        ..Default::default()
    };
    gw.runner().push_ok(serde_json::to_string(&bead).unwrap());

    remove(&gw, "gt-leg-1").await.unwrap();

    let ops: Vec<String> = gw.runner_calls().iter().map(|(a, _)| a[0].clone()).collect();
    assert_eq!(ops, vec!["show", "slot", "dep"]);
    assert_eq!(
        gw.runner_calls()[2].0,
        vec!["dep", "remove", "gt-leg-1", "gt-epic-1"]
    );
}

#[tokio::test]
async fn remove_without_delegation_is_noop() {
    let (gw, _dir) = fake_gateway();
    let bead = Bead { id: "gt-leg-1".to_string(), ..Default::default() };
    gw.runner().push_ok(serde_json::to_string(&bead).unwrap());

    remove(&gw, "gt-leg-1").await.unwrap();
    assert_eq!(gw.runner_calls().len(), 1); // just the show
}

#[test]
fn terms_are_optional_in_json() {
    let mut d = delegation();
    d.terms = None;
    let json = serde_json::to_string(&d).unwrap();
    assert!(!json.contains("terms"));
    let parsed: Delegation = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, d);
}
