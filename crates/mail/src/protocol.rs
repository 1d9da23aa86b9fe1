// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol classifier and payload parsers.
//!
//! Agents speak through message subjects; a regex battery maps each
//! subject to a protocol kind and a body parser extracts the key:value
//! payload. Unknown subjects stay ordinary mail.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// What a message subject announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    PolecatDone,
    LifecycleShutdown,
    Help,
    Merged,
    MergeFailed,
    Handoff,
    SwarmStart,
    Unknown,
}

struct Battery {
    polecat_done: Regex,
    lifecycle_shutdown: Regex,
    help: Regex,
    merged: Regex,
    merge_failed: Regex,
    handoff: Regex,
    swarm_start: Regex,
}

fn battery() -> &'static Battery {
    static BATTERY: OnceLock<Battery> = OnceLock::new();
    BATTERY.get_or_init(|| Battery {
        polecat_done: build(r"(?i)^\s*polecat[_\s-]?done\b"),
        lifecycle_shutdown: build(r"(?i)^\s*(lifecycle\b.*\bshutdown|shutdown(\s+request)?)\s*$"),
        help: build(r"(?i)^\s*help\b"),
        merged: build(r"(?i)^\s*merged\b"),
        merge_failed: build(r"(?i)^\s*merge[_\s-]?failed\b"),
        handoff: build(r"(?i)^\s*handoff\b"),
        swarm_start: build(r"(?i)^\s*swarm[_\s-]?start\b"),
    })
}

fn build(pattern: &str) -> Regex {
    // Patterns are compile-time constants; a bad one is a programmer error
    #[allow(clippy::unwrap_used)]
    Regex::new(pattern).unwrap()
}

/// Classify a message subject.
pub fn classify(subject: &str) -> ProtocolKind {
    let b = battery();
    // merge_failed before merged: "MERGE_FAILED" must not read as "merged"
    if b.polecat_done.is_match(subject) {
        ProtocolKind::PolecatDone
    } else if b.merge_failed.is_match(subject) {
        ProtocolKind::MergeFailed
    } else if b.merged.is_match(subject) {
        ProtocolKind::Merged
    } else if b.lifecycle_shutdown.is_match(subject) {
        ProtocolKind::LifecycleShutdown
    } else if b.help.is_match(subject) {
        ProtocolKind::Help
    } else if b.handoff.is_match(subject) {
        ProtocolKind::Handoff
    } else if b.swarm_start.is_match(subject) {
        ProtocolKind::SwarmStart
    } else {
        ProtocolKind::Unknown
    }
}

/// Key:value payload lines from a protocol message body.
pub fn parse_payload(body: &str) -> std::collections::HashMap<String, String> {
    let mut out = std::collections::HashMap::new();
    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() || key.contains(' ') {
            continue;
        }
        out.entry(key).or_insert_with(|| value.trim().to_string());
    }
    out
}

/// Action requested through the lifecycle inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Cycle,
    Restart,
    Shutdown,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Cycle => "cycle",
            LifecycleAction::Restart => "restart",
            LifecycleAction::Shutdown => "shutdown",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "cycle" | "recycle" => Some(LifecycleAction::Cycle),
            "restart" | "reboot" => Some(LifecycleAction::Restart),
            "shutdown" | "stop" => Some(LifecycleAction::Shutdown),
            _ => None,
        }
    }
}

/// A parsed lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRequest {
    pub from: String,
    pub action: LifecycleAction,
    /// Epoch milliseconds when the request message was sent.
    pub timestamp: Option<u64>,
}

#[derive(Deserialize)]
struct LifecycleBody {
    action: String,
}

/// Parse a lifecycle-request message. The body may be JSON
/// (`{"action": "cycle"}`) or a bare word synonym; an empty body falls
/// back to the subject.
pub fn parse_lifecycle_request(
    from: &str,
    subject: &str,
    body: &str,
    timestamp: Option<u64>,
) -> Option<LifecycleRequest> {
    let action = serde_json::from_str::<LifecycleBody>(body.trim())
        .ok()
        .and_then(|b| LifecycleAction::from_word(&b.action))
        .or_else(|| LifecycleAction::from_word(body))
        .or_else(|| LifecycleAction::from_word(subject))?;
    Some(LifecycleRequest { from: from.to_string(), action, timestamp })
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
