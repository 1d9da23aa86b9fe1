// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive group expansion.
//!
//! Members come in three shapes: concrete addresses (passed through),
//! wildcard patterns (matched against the known-address universe), and
//! `@name` references to other groups (resolved depth-first). A visited
//! set breaks membership cycles; output preserves first-seen order with no
//! duplicates.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use gt_beads::gateway::{BeadsRunner, Gateway};
use gt_beads::stores::groups;
use gt_beads::BeadsError;
use gt_core::pattern::pattern_matches;

use crate::error::MailError;

/// Expand a group against the universe of known concrete addresses.
pub async fn expand_group<R: BeadsRunner>(
    gw: &Gateway<R>,
    name: &str,
    universe: &[String],
) -> Result<Vec<String>, MailError> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    expand_inner(gw, name.to_string(), universe, &mut visited, &mut seen, &mut out).await?;
    Ok(out)
}

fn expand_inner<'a, R: BeadsRunner>(
    gw: &'a Gateway<R>,
    name: String,
    universe: &'a [String],
    visited: &'a mut HashSet<String>,
    seen: &'a mut HashSet<String>,
    out: &'a mut Vec<String>,
) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
    Box::pin(async move {
        if !visited.insert(name.clone()) {
            // Cycle: this group is already on the expansion path
            return Ok(());
        }
        let group = match groups::get(gw, &name).await {
            Ok(group) => group,
            Err(BeadsError::NotFound(_)) => return Err(MailError::GroupNotFound(name)),
            Err(e) => return Err(e.into()),
        };
        for member in &group.members {
            if let Some(nested) = member.strip_prefix('@') {
                expand_inner(gw, nested.to_string(), universe, visited, seen, out).await?;
            } else if member.contains('*') {
                for addr in universe {
                    if pattern_matches(member, addr) && seen.insert(addr.clone()) {
                        out.push(addr.clone());
                    }
                }
            } else if seen.insert(member.clone()) {
                out.push(member.clone());
            }
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
