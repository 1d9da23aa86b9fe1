// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-registry: worker lifecycle managers.
//!
//! One registry per worker class (town dogs; rig polecats, crew, witness,
//! refinery), all sharing the same state-file discipline. The state file
//! is authoritative for lifecycle; the agent bead is the system-wide
//! index; the session belongs to tmux and is merely observed.

pub mod error;
pub mod hooks;
pub mod registry;
pub mod state_file;
pub mod worktree;

pub use error::RegistryError;
pub use registry::{Registry, RegistryConfig, RigRef, SpawnRequest};
pub use state_file::{WorkerState, WorkerStatus};
