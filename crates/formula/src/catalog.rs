// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hierarchical molecule catalog.
//!
//! Each layer (town → rig → project) contributes
//! `<layer>/.beads/molecules.jsonl` (one JSON formula per line) behind
//! an optional `.beads/redirect`. Later layers override earlier ones by
//! name.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use gt_beads::gateway::follow_redirect;

use crate::error::FormulaError;
use crate::types::Formula;

/// A loaded formula and the layer that contributed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub formula: Formula,
    pub source: PathBuf,
}

#[derive(Debug, Default)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    /// Load layers in override order (earliest first).
    pub fn load(layers: &[&Path]) -> Result<Catalog, FormulaError> {
        let mut catalog = Catalog::default();
        for layer in layers {
            catalog.load_layer(layer)?;
        }
        Ok(catalog)
    }

    /// Merge one layer; entries with known names replace earlier ones.
    pub fn load_layer(&mut self, layer: &Path) -> Result<(), FormulaError> {
        let target = follow_redirect(layer.to_path_buf());
        let path = target.join(".beads/molecules.jsonl");
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(FormulaError::Io { path: path.display().to_string(), source })
            }
        };

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let formula: Formula = serde_json::from_str(line).map_err(|source| {
                FormulaError::MoleculeJson {
                    path: path.display().to_string(),
                    line: line_no + 1,
                    source,
                }
            })?;
            formula.validate()?;
            self.entries.insert(
                formula.name.clone(),
                CatalogEntry { formula, source: target.clone() },
            );
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
