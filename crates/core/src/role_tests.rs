// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    mayor    = { Role::Mayor,    "mayor" },
    deacon   = { Role::Deacon,   "deacon" },
    dog      = { Role::Dog,      "dog" },
    witness  = { Role::Witness,  "witness" },
    refinery = { Role::Refinery, "refinery" },
    crew     = { Role::Crew,     "crew" },
    polecat  = { Role::Polecat,  "polecat" },
)]
fn token_roundtrips(role: Role, token: &str) {
    assert_eq!(role.as_str(), token);
    assert_eq!(Role::from_token(token), Some(role));
}

#[test]
fn unknown_token_rejected() {
    assert_eq!(Role::from_token("imperator"), None);
    assert_eq!(Role::from_token(""), None);
    assert_eq!(Role::from_token("Mayor"), None);
}

#[yare::parameterized(
    mayor    = { Role::Mayor,    false, false },
    deacon   = { Role::Deacon,   false, false },
    dog      = { Role::Dog,      false, true },
    witness  = { Role::Witness,  true,  false },
    refinery = { Role::Refinery, true,  false },
    crew     = { Role::Crew,     true,  true },
    polecat  = { Role::Polecat,  true,  true },
)]
fn rig_and_name_requirements(role: Role, rig: bool, name: bool) {
    assert_eq!(role.requires_rig(), rig);
    assert_eq!(role.requires_name(), name);
    assert_eq!(role.is_town_level(), !rig);
}

#[test]
fn serde_uses_lowercase() {
    let json = serde_json::to_string(&Role::Polecat).unwrap();
    assert_eq!(json, "\"polecat\"");
    let parsed: Role = serde_json::from_str("\"witness\"").unwrap();
    assert_eq!(parsed, Role::Witness);
}
