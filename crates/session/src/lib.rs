// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-session: the terminal-session fabric.
//!
//! Sessions live in tmux and are owned by it; this crate only creates,
//! kills, observes, and feeds them. Session names are a pure function of
//! identity (see `gt_core::session_name`), and every new session gets a
//! startup beacon injected into its input stream.

pub mod backend;
pub mod beacon;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod tmux;

pub use backend::{SessionBackend, SessionSpec};
pub use beacon::{beacon, stale_message_diagnostic, startup_prompt, Topic};
pub use error::SessionError;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBackend;
pub use tmux::TmuxBackend;
