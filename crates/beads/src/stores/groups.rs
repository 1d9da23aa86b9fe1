// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group records (`hq-group-<name>`, label `gt:group`).
//!
//! Members are addresses, wildcard patterns, or `@`-prefixed nested group
//! names. Recursive expansion (with cycle detection) lives in the message
//! fabric; this store only persists membership.

use gt_core::envelope::{format_envelope, parse_envelope};

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway, UpdateSpec};
use crate::record::{labels, Bead};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub members: Vec<String>,
}

pub fn group_id(name: &str) -> String {
    format!("hq-group-{name}")
}

pub fn format_description(group: &Group) -> String {
    let members = group.members.join(",");
    format_envelope(
        &format!("Group {}", group.name),
        &[
            ("name", Some(group.name.as_str())),
            ("members", if members.is_empty() { None } else { Some(&members) }),
        ],
    )
}

pub fn parse(bead: &Bead) -> Group {
    let env = parse_envelope(&bead.description);
    Group {
        name: env.get("name").to_string(),
        members: env
            .get("members")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

pub async fn create<R: BeadsRunner>(gw: &Gateway<R>, group: &Group) -> Result<(), BeadsError> {
    gw.create(&CreateSpec {
        id: group_id(&group.name),
        title: format!("Group {}", group.name),
        description: format_description(group),
        issue_type: "task".to_string(),
        labels: vec![labels::GROUP.to_string()],
    })
    .await
}

pub async fn get<R: BeadsRunner>(gw: &Gateway<R>, name: &str) -> Result<Group, BeadsError> {
    Ok(parse(&gw.show(&group_id(name)).await?))
}

pub async fn add_member<R: BeadsRunner>(
    gw: &Gateway<R>,
    name: &str,
    member: &str,
) -> Result<(), BeadsError> {
    let mut group = get(gw, name).await?;
    if !group.members.iter().any(|m| m == member) {
        group.members.push(member.to_string());
        save(gw, &group).await?;
    }
    Ok(())
}

pub async fn remove_member<R: BeadsRunner>(
    gw: &Gateway<R>,
    name: &str,
    member: &str,
) -> Result<(), BeadsError> {
    let mut group = get(gw, name).await?;
    let before = group.members.len();
    group.members.retain(|m| m != member);
    if group.members.len() != before {
        save(gw, &group).await?;
    }
    Ok(())
}

async fn save<R: BeadsRunner>(gw: &Gateway<R>, group: &Group) -> Result<(), BeadsError> {
    gw.update(
        &group_id(&group.name),
        &UpdateSpec { description: Some(format_description(group)), ..Default::default() },
    )
    .await
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
