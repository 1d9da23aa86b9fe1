// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-beads: typed façade over the external issue-tracker CLI.
//!
//! Everything the town persists lives in bead records; this crate owns the
//! single gateway all record traffic flows through (bounded by a
//! three-permit semaphore, routed by prefix), the typed record stores
//! layered on the description envelope, and the merge-slot broker.

pub mod error;
pub mod gateway;
pub mod mergeslot;
pub mod record;
pub mod stores;

pub use error::BeadsError;
#[cfg(any(test, feature = "test-support"))]
pub use gateway::FakeRunner;
pub use gateway::{BeadsRunner, ExecRunner, Gateway, RunOutput};
pub use mergeslot::{MergeSlot, SlotState};
pub use record::Bead;
