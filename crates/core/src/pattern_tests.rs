// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    exact_hit        = { "gastown/witness", "gastown/witness", true },
    exact_miss       = { "gastown/witness", "beads/witness", false },
    star_all_flat    = { "*", "anything", true },
    star_all_deep    = { "*", "gastown/polecats/nux", true },
    prefix_hit       = { "gastown/*", "gastown/witness", true },
    prefix_one_seg   = { "gastown/*", "gastown/crew/max", false },
    prefix_empty     = { "gastown/*", "gastown/", false },
    prefix_miss      = { "gastown/*", "beads/witness", false },
    suffix_hit       = { "*/witness", "gastown/witness", true },
    suffix_other_rig = { "*/witness", "beads/witness", true },
    suffix_one_seg   = { "*/witness", "a/b/witness", false },
    suffix_miss      = { "*/witness", "gastown/refinery", false },
    suffix_bare      = { "*/witness", "witness", false },
)]
fn pattern_forms(pattern: &str, candidate: &str, expected: bool) {
    assert_eq!(pattern_matches(pattern, candidate), expected);
}
