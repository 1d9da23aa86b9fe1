// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Merge-request records (label `gt:merge-request`).
//!
//! The description preamble (`branch:` and `target:` lines before any
//! free-form body) is the sole index for "the MR for this branch".

use crate::error::BeadsError;
use crate::gateway::{BeadsRunner, CreateSpec, Gateway};
use crate::record::{labels, Bead};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRequest {
    pub id: String,
    pub branch: String,
    pub target: String,
    pub body: String,
}

pub fn format_description(mr: &MergeRequest) -> String {
    let mut out = format!("branch: {}\ntarget: {}\n", mr.branch, mr.target);
    if !mr.body.is_empty() {
        out.push('\n');
        out.push_str(&mr.body);
        if !mr.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Parse the preamble. Lines after the first blank line are body, not index.
pub fn parse(bead: &Bead) -> MergeRequest {
    let mut mr = MergeRequest { id: bead.id.clone(), ..Default::default() };
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;
    for line in bead.description.lines() {
        if in_body {
            body_lines.push(line);
            continue;
        }
        if line.trim().is_empty() {
            in_body = true;
            continue;
        }
        if let Some(value) = line.strip_prefix("branch:") {
            mr.branch = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("target:") {
            mr.target = value.trim().to_string();
        }
    }
    mr.body = body_lines.join("\n");
    mr
}

pub async fn create<R: BeadsRunner>(
    gw: &Gateway<R>,
    id: &str,
    mr: &MergeRequest,
) -> Result<(), BeadsError> {
    gw.create(&CreateSpec {
        id: id.to_string(),
        title: format!("MR: {} -> {}", mr.branch, mr.target),
        description: format_description(mr),
        issue_type: "task".to_string(),
        labels: vec![labels::MERGE_REQUEST.to_string()],
    })
    .await
}

/// Find the open MR for a branch, if any.
pub async fn find_for_branch<R: BeadsRunner>(
    gw: &Gateway<R>,
    branch: &str,
) -> Result<Option<MergeRequest>, BeadsError> {
    let beads = gw.list(&[labels::MERGE_REQUEST], Some("open")).await?;
    Ok(beads.iter().map(parse).find(|mr| mr.branch == branch))
}

#[cfg(test)]
#[path = "merge_requests_tests.rs"]
mod tests;
