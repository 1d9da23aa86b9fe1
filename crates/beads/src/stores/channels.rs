// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel records (`hq-channel-<name>`, label `gt:channel`).
//!
//! A channel is pure metadata: posts are ordinary messages bearing the
//! `channel:<name>` label, so membership is a query, not routing state.
//! Retention enforcement lives in the message fabric.

use gt_core::envelope::{format_envelope, parse_envelope};
use serde::{Deserialize, Serialize};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway, UpdateSpec};
use crate::record::{labels, Bead};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    Active,
    Closed,
}

impl ChannelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelStatus::Active => "active",
            ChannelStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub subscribers: Vec<String>,
    pub status: ChannelStatus,
    /// Keep at most this many open posts; 0 = unlimited.
    pub retention_count: u64,
    /// Close posts older than this; 0 = forever.
    pub retention_hours: u64,
    pub created_by: String,
    pub created_at: String,
}

pub fn channel_id(name: &str) -> String {
    format!("hq-channel-{name}")
}

pub fn format_description(ch: &Channel) -> String {
    let subscribers = ch.subscribers.join(",");
    let count = ch.retention_count.to_string();
    let hours = ch.retention_hours.to_string();
    format_envelope(
        &format!("Channel {}", ch.name),
        &[
            ("name", Some(ch.name.as_str())),
            ("subscribers", non_empty(&subscribers)),
            ("status", Some(ch.status.as_str())),
            ("retention_count", Some(&count)),
            ("retention_hours", Some(&hours)),
            ("created_by", non_empty(&ch.created_by)),
            ("created_at", non_empty(&ch.created_at)),
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

pub fn parse(bead: &Bead) -> Channel {
    let env = parse_envelope(&bead.description);
    let status = if env.get("status") == "closed" {
        ChannelStatus::Closed
    } else {
        ChannelStatus::Active
    };
    Channel {
        name: env.get("name").to_string(),
        subscribers: env
            .get("subscribers")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        status,
        retention_count: env.get("retention_count").parse().unwrap_or(0),
        retention_hours: env.get("retention_hours").parse().unwrap_or(0),
        created_by: env.get("created_by").to_string(),
        created_at: env.get("created_at").to_string(),
    }
}

pub async fn create<R: BeadsRunner>(gw: &Gateway<R>, ch: &Channel) -> Result<(), BeadsError> {
    gw.create(&CreateSpec {
        id: channel_id(&ch.name),
        title: format!("Channel {}", ch.name),
        description: format_description(ch),
        issue_type: "task".to_string(),
        labels: vec![labels::CHANNEL.to_string()],
    })
    .await
}

pub async fn get<R: BeadsRunner>(gw: &Gateway<R>, name: &str) -> Result<Channel, BeadsError> {
    Ok(parse(&gw.show(&channel_id(name)).await?))
}

pub async fn list<R: BeadsRunner>(gw: &Gateway<R>) -> Result<Vec<Channel>, BeadsError> {
    Ok(gw.list(&[labels::CHANNEL], None).await?.iter().map(parse).collect())
}

pub async fn update<R: BeadsRunner>(gw: &Gateway<R>, ch: &Channel) -> Result<(), BeadsError> {
    gw.update(
        &channel_id(&ch.name),
        &UpdateSpec { description: Some(format_description(ch)), ..Default::default() },
    )
    .await
}

/// Close the channel record itself (posts keep their own lifecycle).
pub async fn close<R: BeadsRunner>(gw: &Gateway<R>, name: &str) -> Result<(), BeadsError> {
    let mut ch = get(gw, name).await?;
    ch.status = ChannelStatus::Closed;
    update(gw, &ch).await?;
    gw.close(&channel_id(name)).await
}

#[cfg(test)]
#[path = "channels_tests.rs"]
mod tests;
