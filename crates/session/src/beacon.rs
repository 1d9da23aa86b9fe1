// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The startup beacon.
//!
//! Every new session receives one canonical block telling the agent who it
//! is, who started it, and why. Topics that hand the agent work carry
//! explicit instructions; bare `start`/`restart` must not, since a restarted
//! agent re-derives its situation from its hook and mail.

use std::fmt;

/// Why this session is being started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Work was placed on the agent's hook before the start
    Assigned,
    /// Fresh seat, no prior conversation
    ColdStart,
    /// Taking over another agent's seat
    Handoff,
    Start,
    Restart,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Assigned => "assigned",
            Topic::ColdStart => "cold-start",
            Topic::Handoff => "handoff",
            Topic::Start => "start",
            Topic::Restart => "restart",
        }
    }

    fn instructions(&self) -> Option<&'static str> {
        match self {
            Topic::Assigned => Some("Work is on your hook. Run `gt hook` to see it."),
            Topic::ColdStart => Some("Check your hook and mail."),
            Topic::Handoff => {
                Some("You are taking over this seat. Check your hook and mail.")
            }
            Topic::Start | Topic::Restart => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compose the beacon block.
///
/// ```text
/// [GAS TOWN] <recipient> <- <sender> :: <topic>[:<mol-id>]
/// <instructions appropriate to topic>
/// ```
pub fn beacon(topic: Topic, recipient: &str, sender: &str, mol_id: Option<&str>) -> String {
    let mut out = format!("[GAS TOWN] {recipient} <- {sender} :: {topic}");
    if let Some(mol) = mol_id {
        out.push(':');
        out.push_str(mol);
    }
    out.push('\n');
    if let Some(instructions) = topic.instructions() {
        out.push_str(instructions);
        out.push('\n');
    }
    out
}

/// Beacon plus the role's startup instruction block.
pub fn startup_prompt(
    topic: Topic,
    recipient: &str,
    sender: &str,
    mol_id: Option<&str>,
    role_instructions: Option<&str>,
) -> String {
    let mut out = beacon(topic, recipient, sender, mol_id);
    if let Some(extra) = role_instructions {
        let extra = extra.trim_end();
        if !extra.is_empty() {
            out.push('\n');
            out.push_str(extra);
            out.push('\n');
        }
    }
    out
}

/// A message that predates its recipient's session was sent to a previous
/// incarnation. Reported, never discarded; the reader decides.
pub fn stale_message_diagnostic(
    message_sent_at_ms: u64,
    session_created_at_secs: u64,
) -> Option<String> {
    let session_ms = session_created_at_secs * 1000;
    if message_sent_at_ms >= session_ms {
        return None;
    }
    Some(format!(
        "message sent {}s before this session started; the sender was talking to a previous incarnation",
        (session_ms - message_sent_at_ms) / 1000
    ))
}

#[cfg(test)]
#[path = "beacon_tests.rs"]
mod tests;
