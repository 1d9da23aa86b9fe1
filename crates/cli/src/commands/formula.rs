// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt formula list|health|update`

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use gt_core::config::RigsConfig;
use gt_formula::{health_check, provision, update, Catalog};

use crate::embedded::EMBEDDED;

#[derive(Subcommand)]
pub enum FormulaCommand {
    /// List formulas visible from this town (town → rig layers)
    List,
    /// Classify embedded formulas against the installed record
    Health,
    /// Install new/outdated/missing formulas, preserving user edits
    Update,
}

pub fn run(town: &Path, command: &FormulaCommand) -> Result<()> {
    match command {
        FormulaCommand::List => list(town),
        FormulaCommand::Health => health(town),
        FormulaCommand::Update => {
            provision(town, EMBEDDED)?;
            let updated = update(town, EMBEDDED)?;
            if updated.is_empty() {
                println!("everything current");
            } else {
                for name in updated {
                    println!("updated {name}");
                }
            }
            Ok(())
        }
    }
}

fn list(town: &Path) -> Result<()> {
    let rigs = RigsConfig::load(town).unwrap_or_default();
    let mut layers = vec![town.to_path_buf()];
    for rig in rigs.rig_names() {
        layers.push(town.join(rig));
    }
    let layer_refs: Vec<&Path> = layers.iter().map(PathBuf::as_path).collect();
    let catalog = Catalog::load(&layer_refs)?;
    for name in catalog.names() {
        if let Some(entry) = catalog.get(name) {
            println!("{name}\t{}\t{}", entry.formula.kind.as_str(), entry.source.display());
        }
    }
    Ok(())
}

fn health(town: &Path) -> Result<()> {
    for (name, health) in health_check(town, EMBEDDED)? {
        println!("{name}\t{health:?}");
    }
    Ok(())
}
