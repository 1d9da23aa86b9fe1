// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation records (label `gt:escalation`).
//!
//! Severity climbs low → medium → high → critical; critical is a fixed
//! point, so a re-escalation there is recorded as skipped rather than
//! bumped. `original_severity` never moves after the first escalation.

use gt_core::envelope::{format_envelope, parse_envelope};
use serde::{Deserialize, Serialize};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway, UpdateSpec};
use crate::record::{labels, Bead};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_str_lenient(s: &str) -> Self {
        match s {
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Low,
        }
    }

    /// Next rung of the ladder; `None` at the critical fixed point.
    pub fn bump(&self) -> Option<Severity> {
        match self {
            Severity::Low => Some(Severity::Medium),
            Severity::Medium => Some(Severity::High),
            Severity::High => Some(Severity::Critical),
            Severity::Critical => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Escalation {
    pub id: String,
    pub severity: Severity,
    pub reason: String,
    pub source: String,
    pub escalated_by: String,
    pub escalated_at: String,
    pub acked_by: String,
    pub acked_at: String,
    pub closed_by: String,
    pub closed_reason: String,
    pub related_bead: String,
    pub original_severity: Severity,
    pub reescalation_count: u64,
    pub last_reescalated_by: String,
    pub last_reescalated_at: String,
}

pub fn format_description(esc: &Escalation) -> String {
    let count = esc.reescalation_count.to_string();
    format_envelope(
        &format!("Escalation: {}", esc.reason),
        &[
            ("severity", Some(esc.severity.as_str())),
            ("reason", non_empty(&esc.reason)),
            ("source", non_empty(&esc.source)),
            ("escalated_by", non_empty(&esc.escalated_by)),
            ("escalated_at", non_empty(&esc.escalated_at)),
            ("acked_by", non_empty(&esc.acked_by)),
            ("acked_at", non_empty(&esc.acked_at)),
            ("closed_by", non_empty(&esc.closed_by)),
            ("closed_reason", non_empty(&esc.closed_reason)),
            ("related_bead", non_empty(&esc.related_bead)),
            ("original_severity", Some(esc.original_severity.as_str())),
            ("reescalation_count", Some(&count)),
            ("last_reescalated_by", non_empty(&esc.last_reescalated_by)),
            ("last_reescalated_at", non_empty(&esc.last_reescalated_at)),
        ],
    )
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

pub fn parse(bead: &Bead) -> Escalation {
    let env = parse_envelope(&bead.description);
    Escalation {
        id: bead.id.clone(),
        severity: Severity::from_str_lenient(env.get("severity")),
        reason: env.get("reason").to_string(),
        source: env.get("source").to_string(),
        escalated_by: env.get("escalated_by").to_string(),
        escalated_at: env.get("escalated_at").to_string(),
        acked_by: env.get("acked_by").to_string(),
        acked_at: env.get("acked_at").to_string(),
        closed_by: env.get("closed_by").to_string(),
        closed_reason: env.get("closed_reason").to_string(),
        related_bead: env.get("related_bead").to_string(),
        original_severity: Severity::from_str_lenient(env.get("original_severity")),
        reescalation_count: env.get("reescalation_count").parse().unwrap_or(0),
        last_reescalated_by: env.get("last_reescalated_by").to_string(),
        last_reescalated_at: env.get("last_reescalated_at").to_string(),
    }
}

pub async fn create<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    esc: &Escalation,
) -> Result<(), BeadsError> {
    // original_severity is pinned at creation and never moves afterwards
    let mut esc = esc.clone();
    esc.original_severity = esc.severity;
    let esc = &esc;
    gw.create(&CreateSpec {
        id: id.to_string(),
        title: format!("Escalation: {}", esc.reason),
        description: format_description(esc),
        issue_type: "task".to_string(),
        labels: vec![
            labels::ESCALATION.to_string(),
            labels::severity(esc.severity.as_str()),
        ],
    })
    .await
}

pub async fn get<R: BeadsRunner>(gw: &Gateway<R>, id: &str) -> Result<Escalation, BeadsError> {
    Ok(parse(&gw.show(id).await?))
}

pub async fn ack<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    by: &str,
    at: &str,
) -> Result<(), BeadsError> {
    let mut esc = get(gw, id).await?;
    esc.acked_by = by.to_string();
    esc.acked_at = at.to_string();
    save(gw, &esc).await?;
    gw.add_label(id, labels::ACKED).await
}

pub async fn close<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    by: &str,
    reason: &str,
) -> Result<(), BeadsError> {
    let mut esc = get(gw, id).await?;
    esc.closed_by = by.to_string();
    esc.closed_reason = reason.to_string();
    save(gw, &esc).await?;
    gw.add_label(id, labels::RESOLVED).await?;
    gw.close(id).await
}

/// Outcome of a re-escalation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reescalation {
    Bumped { from: Severity, to: Severity },
    Skipped { reason: String },
}

/// Bump the severity one rung, or record a skip at the critical ceiling.
pub async fn reescalate<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    by: &str,
    at: &str,
) -> Result<Reescalation, BeadsError> {
    let mut esc = get(gw, id).await?;
    let Some(next) = esc.severity.bump() else {
        return Ok(Reescalation::Skipped {
            reason: "already at critical severity".to_string(),
        });
    };
    let from = esc.severity;
    esc.severity = next;
    esc.reescalation_count += 1;
    esc.last_reescalated_by = by.to_string();
    esc.last_reescalated_at = at.to_string();
    save(gw, &esc).await?;
    gw.remove_label(id, &labels::severity(from.as_str())).await?;
    gw.add_label(id, &labels::severity(next.as_str())).await?;
    gw.add_label(id, labels::REESCALATED).await?;
    Ok(Reescalation::Bumped { from, to: next })
}

async fn save<R: BeadsRunner>(gw: &Gateway<R>, esc: &Escalation) -> Result<(), BeadsError> {
    gw.update(
        &esc.id,
        &UpdateSpec {
            title: Some(format!("Escalation: {}", esc.reason)),
            description: Some(format_description(esc)),
            ..Default::default()
        },
    )
    .await
}

#[cfg(test)]
#[path = "escalations_tests.rs"]
mod tests;
