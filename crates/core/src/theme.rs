// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic rig theme assignment.
//!
//! Each rig gets a stable colour theme for its tmux status bars so an
//! operator can tell sessions apart at a glance. Assignment is a pure
//! function of the rig name (FNV-1a fold), so every process picks the same
//! theme without coordination.

/// One status-bar colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    /// Status bar background (256-colour terminal palette entry)
    pub bg: &'static str,
    /// Status bar foreground
    pub fg: &'static str,
    /// Accent used for the active-window marker
    pub accent: &'static str,
}

/// Fixed palette. Backgrounds are pairwise distinct so two rigs sharing a
/// theme name is the only possible collision, never two themes sharing a
/// look.
pub const PALETTE: [Theme; 8] = [
    Theme { name: "rust", bg: "colour130", fg: "colour231", accent: "colour208" },
    Theme { name: "ocean", bg: "colour24", fg: "colour231", accent: "colour45" },
    Theme { name: "moss", bg: "colour22", fg: "colour231", accent: "colour118" },
    Theme { name: "plum", bg: "colour54", fg: "colour231", accent: "colour177" },
    Theme { name: "ember", bg: "colour88", fg: "colour231", accent: "colour203" },
    Theme { name: "slate", bg: "colour238", fg: "colour255", accent: "colour110" },
    Theme { name: "brass", bg: "colour58", fg: "colour231", accent: "colour220" },
    Theme { name: "teal", bg: "colour30", fg: "colour231", accent: "colour87" },
];

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Pick the theme for a rig name. Deterministic across processes.
pub fn assign_theme(rig: &str) -> &'static Theme {
    let mut hash = FNV_OFFSET;
    for byte in rig.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    let index = (hash % PALETTE.len() as u64) as usize;
    &PALETTE[index]
}

#[cfg(test)]
#[path = "theme_tests.rs"]
mod tests;
