// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    mayor    = { Identity::town(Role::Mayor), "mayor" },
    deacon   = { Identity::town(Role::Deacon), "deacon" },
    dog      = { Identity::dog("rex"), "dogs/rex" },
    witness  = { Identity::rig_singleton(Role::Witness, "gastown"), "gastown/witness" },
    refinery = { Identity::rig_singleton(Role::Refinery, "beads"), "beads/refinery" },
    crew     = { Identity::rig_named(Role::Crew, "gastown", "max"), "gastown/crew/max" },
    polecat  = { Identity::rig_named(Role::Polecat, "gastown", "nux"), "gastown/polecats/nux" },
)]
fn address_roundtrips(identity: Identity, path: &str) {
    let addr = Address::from(identity.clone());
    assert_eq!(addr.to_string(), path);
    assert_eq!(Address::parse(path).unwrap().0, identity);
}

#[test]
fn short_polecat_form_accepted() {
    let addr = Address::parse("gastown/nux").unwrap();
    assert_eq!(addr.0, Identity::rig_named(Role::Polecat, "gastown", "nux"));
    // Canonical rendering is the long form
    assert_eq!(addr.to_string(), "gastown/polecats/nux");
}

#[yare::parameterized(
    empty        = { "" },
    trailing     = { "gastown/" },
    four_parts   = { "gastown/crew/max/extra" },
    empty_dog    = { "dogs/" },
)]
fn malformed_addresses_rejected(path: &str) {
    assert!(Address::parse(path).is_err());
}

#[test]
fn hyphenated_rig_in_address() {
    let addr = Address::parse("bullet-farm/crew/max").unwrap();
    assert_eq!(addr.0, Identity::rig_named(Role::Crew, "bullet-farm", "max"));
}
