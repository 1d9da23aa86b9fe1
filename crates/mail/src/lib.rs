// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-mail: the message fabric.
//!
//! Mail, channels, and groups layered on bead records; on-disk
//! notification slots for nudge deduplication; the protocol classifier
//! that turns message subjects into typed inter-agent events.

pub mod channel;
pub mod error;
pub mod group;
pub mod message;
pub mod protocol;
pub mod slots;

pub use channel::enforce_retention;
pub use error::MailError;
pub use group::expand_group;
pub use message::{Mailroom, Message, MessageDraft};
pub use protocol::{
    classify, parse_lifecycle_request, LifecycleAction, LifecycleRequest, ProtocolKind,
};
pub use slots::{SlotEntry, SlotStore};
