// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue records (`<prefix>-q-<name>`).
//!
//! A queue gates who may claim its items via a claim pattern matched
//! against the claimant's address (exact, trailing `*`, or leading `*/`,
//! each covering one path segment).

use gt_core::envelope::{format_envelope, parse_envelope};
use gt_core::pattern::pattern_matches;
use serde::{Deserialize, Serialize};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway, UpdateSpec};
use crate::record::Bead;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    #[default]
    Active,
    Paused,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Active => "active",
            QueueStatus::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    pub name: String,
    pub prefix: String,
    pub claim_pattern: String,
    pub status: QueueStatus,
    pub available: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
}

impl Default for Queue {
    fn default() -> Self {
        Self {
            name: String::new(),
            prefix: String::new(),
            claim_pattern: "*".to_string(),
            status: QueueStatus::Active,
            available: 0,
            processing: 0,
            completed: 0,
            failed: 0,
        }
    }
}

impl Queue {
    pub fn id(&self) -> String {
        queue_id(&self.prefix, &self.name)
    }

    /// May this address claim from the queue? Paused queues admit nobody.
    pub fn claim_allowed(&self, claimant: &str) -> bool {
        self.status == QueueStatus::Active && pattern_matches(&self.claim_pattern, claimant)
    }
}

pub fn queue_id(prefix: &str, name: &str) -> String {
    format!("{prefix}-q-{name}")
}

pub fn format_description(queue: &Queue) -> String {
    let available = queue.available.to_string();
    let processing = queue.processing.to_string();
    let completed = queue.completed.to_string();
    let failed = queue.failed.to_string();
    format_envelope(
        &format!("Queue {}", queue.name),
        &[
            ("name", Some(queue.name.as_str())),
            ("claim_pattern", Some(queue.claim_pattern.as_str())),
            ("status", Some(queue.status.as_str())),
            ("available", Some(&available)),
            ("processing", Some(&processing)),
            ("completed", Some(&completed)),
            ("failed", Some(&failed)),
        ],
    )
}

pub fn parse(bead: &Bead) -> Queue {
    let env = parse_envelope(&bead.description);
    let claim = env.get("claim_pattern");
    Queue {
        name: env.get("name").to_string(),
        prefix: gt_core::identity::extract_prefix(&bead.id).to_string(),
        claim_pattern: if claim.is_empty() { "*".to_string() } else { claim.to_string() },
        status: if env.get("status") == "paused" {
            QueueStatus::Paused
        } else {
            QueueStatus::Active
        },
        available: env.get("available").parse().unwrap_or(0),
        processing: env.get("processing").parse().unwrap_or(0),
        completed: env.get("completed").parse().unwrap_or(0),
        failed: env.get("failed").parse().unwrap_or(0),
    }
}

pub async fn create<R: BeadsRunner>(gw: &Gateway<R>, queue: &Queue) -> Result<(), BeadsError> {
    gw.create(&CreateSpec {
        id: queue.id(),
        title: format!("Queue {}", queue.name),
        description: format_description(queue),
        issue_type: "task".to_string(),
        labels: vec![],
    })
    .await
}

pub async fn get<R: BeadsRunner>(
    gw: &Gateway<R>,
    prefix: &str,
    name: &str,
) -> Result<Queue, BeadsError> {
    Ok(parse(&gw.show(&queue_id(prefix, name)).await?))
}

pub async fn save<R: BeadsRunner>(gw: &Gateway<R>, queue: &Queue) -> Result<(), BeadsError> {
    gw.update(
        &queue.id(),
        &UpdateSpec { description: Some(format_description(queue)), ..Default::default() },
    )
    .await
}

pub async fn set_status<R: BeadsRunner>(
    gw: &Gateway<R>,
    prefix: &str,
    name: &str,
    status: QueueStatus,
) -> Result<(), BeadsError> {
    let mut queue = get(gw, prefix, name).await?;
    queue.status = status;
    save(gw, &queue).await
}

#[cfg(test)]
#[path = "queues_tests.rs"]
mod tests;
