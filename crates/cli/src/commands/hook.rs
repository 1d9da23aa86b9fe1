// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt hook`: what is on the calling agent's hook?
//!
//! Agents run inside sessions provisioned with GT_ROLE/GT_RIG/GT_NAME;
//! this resolves that identity to its agent bead and prints the hook.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use gt_beads::stores::agents;
use gt_beads::{ExecRunner, Gateway};
use gt_core::config::RigsConfig;
use gt_core::identity::Identity;
use gt_core::role::Role;

pub async fn run(town: &Path) -> Result<()> {
    let role = std::env::var("GT_ROLE").context("GT_ROLE not set; are you inside a session?")?;
    let Some(role) = Role::from_token(&role) else {
        bail!("unknown role in GT_ROLE: {role:?}");
    };
    let rig = std::env::var("GT_RIG").unwrap_or_default();
    let name = std::env::var("GT_NAME").unwrap_or_default();

    let identity = Identity { role, rig: rig.clone(), name };
    let prefix = if role.is_town_level() {
        "hq".to_string()
    } else {
        let rigs = RigsConfig::load(town)?;
        rigs.prefix_for(&rig)
            .with_context(|| format!("rig {rig:?} not in catalog"))?
            .to_string()
    };
    let bead_id = identity.bead_id(&prefix)?;

    let gw = Arc::new(Gateway::new(ExecRunner::new(), town));
    let record = agents::get(&gw, &bead_id).await?;
    if record.hook_bead.is_empty() {
        println!("hook empty");
    } else {
        println!("{}", record.hook_bead);
        let work = gw.show(&record.hook_bead).await?;
        println!("{}: {}", work.id, work.title);
    }
    Ok(())
}
