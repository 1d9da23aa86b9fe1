// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-core: identity, address, and envelope codecs for the Gas Town
//! supervisor, plus the shared error taxonomy, clock abstraction, role
//! definition tables, and rig theme assignment.

pub mod address;
pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod pattern;
pub mod role;
pub mod roledef;
pub mod session_name;
pub mod theme;

pub use address::Address;
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
pub use clock::{Clock, SystemClock};
pub use config::{DaemonConfig, RigEntry, RigsConfig, TownConfig};
pub use envelope::{format_envelope, parse_envelope, ParsedEnvelope, NULL_SENTINEL};
pub use error::ErrorKind;
pub use identity::{extract_prefix, needs_force, Identity, IdentityError};
pub use pattern::pattern_matches;
pub use role::Role;
pub use roledef::{HealthThresholds, RoleDef, RoleTable};
pub use session_name::{parse_session_name, session_name, BOOT_SESSION, TOWN_SESSION_PREFIX};
pub use theme::{assign_theme, Theme, PALETTE};
