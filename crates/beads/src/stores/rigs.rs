// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rig records (label `gt:rig`): the store-side mirror of the rig catalog.

use gt_core::envelope::{format_envelope, parse_envelope};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway};
use crate::record::{labels, Bead};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RigRecord {
    pub name: String,
    pub git_url: String,
    pub prefix: String,
}

pub fn rig_id(name: &str) -> String {
    format!("hq-rig-{name}")
}

pub fn format_description(rig: &RigRecord) -> String {
    format_envelope(
        &format!("Rig {}", rig.name),
        &[
            ("name", Some(rig.name.as_str())),
            ("git_url", Some(rig.git_url.as_str())),
            ("prefix", Some(rig.prefix.as_str())),
        ],
    )
}

pub fn parse(bead: &Bead) -> RigRecord {
    let env = parse_envelope(&bead.description);
    RigRecord {
        name: env.get("name").to_string(),
        git_url: env.get("git_url").to_string(),
        prefix: env.get("prefix").to_string(),
    }
}

pub async fn create<R: BeadsRunner>(gw: &Gateway<R>, rig: &RigRecord) -> Result<(), BeadsError> {
    gw.create(&CreateSpec {
        id: rig_id(&rig.name),
        title: format!("Rig {}", rig.name),
        description: format_description(rig),
        issue_type: "task".to_string(),
        labels: vec![labels::RIG.to_string()],
    })
    .await
}

pub async fn list<R: BeadsRunner>(gw: &Gateway<R>) -> Result<Vec<RigRecord>, BeadsError> {
    Ok(gw.list(&[labels::RIG], None).await?.iter().map(parse).collect())
}
