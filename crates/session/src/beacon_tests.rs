// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn assigned_beacon_exact_text() {
    let text = beacon(Topic::Assigned, "gastown/polecats/nux", "deacon", None);
    assert_eq!(
        text,
        "[GAS TOWN] gastown/polecats/nux <- deacon :: assigned\n\
         Work is on your hook. Run `gt hook` to see it.\n"
    );
}

#[test]
fn cold_start_beacon_with_mol_id() {
    let text = beacon(Topic::ColdStart, "gastown/witness", "mayor", Some("mol-7"));
    assert_eq!(
        text,
        "[GAS TOWN] gastown/witness <- mayor :: cold-start:mol-7\n\
         Check your hook and mail.\n"
    );
}

#[yare::parameterized(
    start   = { Topic::Start },
    restart = { Topic::Restart },
)]
fn bare_topics_carry_no_instructions(topic: Topic) {
    let text = beacon(topic, "deacon", "mayor", None);
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("[GAS TOWN] deacon <- mayor :: "));
}

#[test]
fn handoff_beacon_mentions_takeover() {
    let text = beacon(Topic::Handoff, "gastown/crew/max", "gastown/crew/joe", None);
    assert!(text.contains("taking over this seat"));
}

#[test]
fn startup_prompt_appends_role_instructions() {
    let prompt = startup_prompt(
        Topic::Assigned,
        "gastown/polecats/nux",
        "deacon",
        None,
        Some("You are a polecat. Finish the hook, file an MR, report done.\n"),
    );
    assert!(prompt.starts_with("[GAS TOWN]"));
    assert!(prompt.contains("Work is on your hook."));
    assert!(prompt.ends_with("report done.\n"));
}

#[test]
fn startup_prompt_without_role_instructions_is_just_the_beacon() {
    let prompt = startup_prompt(Topic::Restart, "deacon", "mayor", None, None);
    assert_eq!(prompt, beacon(Topic::Restart, "deacon", "mayor", None));
}

#[test]
fn message_after_session_start_is_fresh() {
    assert_eq!(stale_message_diagnostic(5_000_000, 5_000), None);
    assert_eq!(stale_message_diagnostic(5_000_000, 4_000), None);
}

#[test]
fn message_before_session_start_is_stale() {
    let diag = stale_message_diagnostic(3_000_000, 5_000).unwrap();
    assert!(diag.contains("2000s before"));
    assert!(diag.contains("previous incarnation"));
}
