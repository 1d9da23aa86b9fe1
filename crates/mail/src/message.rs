// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail over bead records.
//!
//! A message is a record of type `message` bearing `gt:message`; channel
//! posts additionally carry `channel:<name>`. Inbox membership is a label
//! query plus recipient matching. Nothing is routed at send time, which
//! is what makes the fabric restart-tolerant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use gt_beads::gateway::{BeadsRunner, CreateSpec, Gateway};
use gt_beads::record::{labels, Bead};
use gt_beads::stores::channels;
use gt_core::pattern::pattern_matches;
use gt_core::Clock;

use crate::channel::enforce_retention;
use crate::error::MailError;

/// Outgoing message fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDraft {
    pub from: String,
    /// Address or pattern (`gastown/*`, `*/witness`)
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A received message, parsed from its bead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub channel: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Sends and lists mail. Owns the message-ID sequence for this process.
pub struct Mailroom<R, C> {
    gw: Arc<Gateway<R>>,
    clock: C,
    seq: AtomicU64,
}

impl<R: BeadsRunner, C: Clock> Mailroom<R, C> {
    pub fn new(gw: Arc<Gateway<R>>, clock: C) -> Self {
        Self { gw, clock, seq: AtomicU64::new(0) }
    }

    pub fn gateway(&self) -> &Gateway<R> {
        &self.gw
    }

    /// Send a message. Returns the new record's ID.
    pub async fn send(&self, draft: &MessageDraft) -> Result<String, MailError> {
        self.send_inner(draft, None).await
    }

    /// Post to a channel: a send with the channel label, followed by
    /// on-write retention enforcement.
    pub async fn post(&self, channel: &str, draft: &MessageDraft) -> Result<String, MailError> {
        let id = self.send_inner(draft, Some(channel)).await?;
        let ch = channels::get(&self.gw, channel).await?;
        if let Err(e) = enforce_retention(&self.gw, &self.clock, &ch, false).await {
            // Retention is housekeeping; the post itself already landed
            tracing::warn!(channel, error = %e, "channel retention enforcement failed");
        }
        Ok(id)
    }

    async fn send_inner(
        &self,
        draft: &MessageDraft,
        channel: Option<&str>,
    ) -> Result<String, MailError> {
        let id = self.next_id();
        let mut message_labels = vec![labels::MESSAGE.to_string()];
        if let Some(name) = channel {
            message_labels.push(labels::channel(name));
        }
        self.gw
            .create(&CreateSpec {
                id: id.clone(),
                title: draft.subject.clone(),
                description: format_message(draft, channel),
                issue_type: "message".to_string(),
                labels: message_labels,
            })
            .await?;
        Ok(id)
    }

    /// Open messages addressed to `address`, oldest first. A message
    /// reaches an inbox when its `to` equals the address or is a pattern
    /// covering it.
    pub async fn inbox(&self, address: &str) -> Result<Vec<Message>, MailError> {
        let beads = self.gw.list(&[labels::MESSAGE], Some("open")).await?;
        let mut messages: Vec<Message> = beads
            .iter()
            .map(parse_message)
            .filter(|m| m.to == address || pattern_matches(&m.to, address))
            .collect();
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    /// Close a message (consumed or pruned).
    pub async fn archive(&self, id: &str) -> Result<(), MailError> {
        self.gw.close(id).await?;
        Ok(())
    }

    fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("hq-msg-{}-{}", self.clock.epoch_ms(), seq)
    }
}

/// Message description layout: subject title, blank, header block, blank,
/// free-form body.
pub fn format_message(draft: &MessageDraft, channel: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&draft.subject);
    out.push_str("\n\n");
    out.push_str(&format!("from: {}\n", draft.from));
    out.push_str(&format!("to: {}\n", draft.to));
    if let Some(name) = channel {
        out.push_str(&format!("channel: {name}\n"));
    }
    if !draft.body.is_empty() {
        out.push('\n');
        out.push_str(&draft.body);
        if !draft.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Parse a message bead: header lines up to the blank separator, body
/// after it.
pub fn parse_message(bead: &Bead) -> Message {
    let mut message = Message {
        id: bead.id.clone(),
        subject: bead.title.clone(),
        sent_at: bead.created_at,
        ..Default::default()
    };

    let mut lines = bead.description.lines();
    if let Some(first) = lines.next() {
        if message.subject.is_empty() {
            message.subject = first.trim().to_string();
        }
    }

    let mut in_body = false;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut seen_headers = false;
    for line in lines {
        if in_body {
            body_lines.push(line);
            continue;
        }
        if line.trim().is_empty() {
            // First blank precedes headers; the one after them starts the body
            if seen_headers {
                in_body = true;
            }
            continue;
        }
        match line.split_once(':') {
            Some(("from", v)) => {
                message.from = v.trim().to_string();
                seen_headers = true;
            }
            Some(("to", v)) => {
                message.to = v.trim().to_string();
                seen_headers = true;
            }
            Some(("channel", v)) => {
                message.channel = Some(v.trim().to_string());
                seen_headers = true;
            }
            _ => {
                // Not a header: body started without a separator
                in_body = true;
                body_lines.push(line);
            }
        }
    }
    message.body = body_lines.join("\n");
    message
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
