// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::gateway::FakeRunner;
use crate::stores::test_support::fake_gateway;

fn slot() -> MergeSlot {
    MergeSlot::for_rig("gt", "gastown")
}

/// Queue a `show` response reflecting the given state.
fn push_state(gw: &Gateway<FakeRunner>, state: &SlotState) {
    let bead = Bead {
        id: slot().id().to_string(),
        description: format_state("gastown", state),
        status: "open".to_string(),
        ..Default::default()
    };
    gw.runner().push_ok(serde_json::to_string(&bead).unwrap());
}

#[test]
fn slot_id_is_single_hyphen() {
    // Keeps the store's prefix heuristic happy without --force
    assert!(!gt_core::identity::needs_force(slot().id()));
}

#[test]
fn state_roundtrips() {
    let state = SlotState {
        available: false,
        holder: "gastown/polecats/nux".to_string(),
        waiters: vec!["gastown/polecats/ace".to_string(), "gastown/crew/max".to_string()],
    };
    let bead = Bead { description: format_state("gastown", &state), ..Default::default() };
    assert_eq!(parse_state(&bead), state);
}

#[test]
fn empty_state_is_available() {
    let state = SlotState { available: true, ..Default::default() };
    let bead = Bead { description: format_state("gastown", &state), ..Default::default() };
    assert_eq!(parse_state(&bead), state);
}

#[tokio::test]
async fn create_is_idempotent() {
    let (gw, _dir) = fake_gateway();
    gw.runner().push_failure(1, "UNIQUE constraint failed");
    slot().create(&gw).await.unwrap();
}

#[tokio::test]
async fn acquire_when_free_takes_the_slot() {
    let (gw, _dir) = fake_gateway();
    push_state(&gw, &SlotState { available: true, ..Default::default() });

    let state = slot().acquire(&gw, "gastown/polecats/nux", false).await.unwrap();
    assert!(!state.available);
    assert_eq!(state.holder, "gastown/polecats/nux");
    assert!(state.waiters.is_empty());
}

#[tokio::test]
async fn contended_acquire_queues_the_caller() {
    let (gw, _dir) = fake_gateway();
    push_state(
        &gw,
        &SlotState {
            available: false,
            holder: "gastown/polecats/nux".to_string(),
            waiters: vec![],
        },
    );

    let state = slot().acquire(&gw, "gastown/polecats/ace", true).await.unwrap();
    assert!(!state.available);
    assert_eq!(state.holder, "gastown/polecats/nux");
    assert_eq!(state.waiters, vec!["gastown/polecats/ace".to_string()]);
}

#[tokio::test]
async fn contended_acquire_without_add_waiter_leaves_queue_alone() {
    let (gw, _dir) = fake_gateway();
    push_state(
        &gw,
        &SlotState { available: false, holder: "h".to_string(), waiters: vec![] },
    );

    let state = slot().acquire(&gw, "other", false).await.unwrap();
    assert!(state.waiters.is_empty());
    // Read-only: no update issued
    let ops: Vec<String> = gw.runner_calls().iter().map(|(a, _)| a[0].clone()).collect();
    assert_eq!(ops, vec!["show"]);
}

#[tokio::test]
async fn release_rejects_non_holder() {
    let (gw, _dir) = fake_gateway();
    push_state(
        &gw,
        &SlotState { available: false, holder: "h".to_string(), waiters: vec![] },
    );

    let err = slot().release(&gw, "impostor").await.unwrap_err();
    assert!(matches!(err, BeadsError::NotHolder { .. }));
}

#[tokio::test]
async fn release_hands_off_fifo() {
    let (gw, _dir) = fake_gateway();
    let s = slot();

    // H0 acquires, W1..W3 queue up, then each release promotes the head.
    let mut state = SlotState { available: true, ..Default::default() };
    let mut owners = Vec::new();

    push_state(&gw, &state);
    state = s.acquire(&gw, "h0", false).await.unwrap();
    owners.push(state.holder.clone());

    for waiter in ["w1", "w2", "w3"] {
        push_state(&gw, &state);
        state = s.acquire(&gw, waiter, true).await.unwrap();
    }
    assert_eq!(state.waiters, vec!["w1", "w2", "w3"]);

    for _ in 0..3 {
        let holder = state.holder.clone();
        push_state(&gw, &state);
        state = s.release(&gw, &holder).await.unwrap();
        owners.push(state.holder.clone());
    }
    assert_eq!(owners, vec!["h0", "w1", "w2", "w3"]);

    // Final release empties the slot
    push_state(&gw, &state);
    state = s.release(&gw, "w3").await.unwrap();
    assert!(state.available);
    assert!(state.holder.is_empty());
}
