// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded formula provisioning and drift tracking.
//!
//! Embedded formulas ship with the binary and are provisioned into
//! `.beads/formulas/` when absent. `.installed.json` records the content
//! hash at install time, which is what lets us tell an upstream update
//! (outdated) from a user edit (modified); user edits are never
//! clobbered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::FormulaError;

/// One formula compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFormula {
    pub name: &'static str,
    pub content: &'static str,
}

/// Drift class of one formula file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaHealth {
    /// Installed, untouched, and current
    Ok,
    /// Embedded changed; the user file still matches the installed hash
    Outdated,
    /// The user changed a tracked file
    Modified,
    /// A tracked file was deleted
    Missing,
    /// Embedded but never installed
    New,
    /// A file exists that the installed record does not know
    Untracked,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InstalledRecord {
    /// formula name → sha256 of content at install time
    #[serde(default)]
    formulas: BTreeMap<String, String>,
}

fn formulas_dir(root: &Path) -> PathBuf {
    root.join(".beads/formulas")
}

fn installed_path(root: &Path) -> PathBuf {
    formulas_dir(root).join(".installed.json")
}

fn formula_path(root: &Path, name: &str) -> PathBuf {
    formulas_dir(root).join(format!("{name}.formula.toml"))
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> FormulaError + '_ {
    move |source| FormulaError::Io { path: path.display().to_string(), source }
}

fn load_record(root: &Path) -> Result<InstalledRecord, FormulaError> {
    let path = installed_path(root);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(InstalledRecord::default())
        }
        Err(source) => return Err(FormulaError::Io { path: path.display().to_string(), source }),
    };
    serde_json::from_str(&text).map_err(|source| FormulaError::InstalledJson {
        path: path.display().to_string(),
        source,
    })
}

fn save_record(root: &Path, record: &InstalledRecord) -> Result<(), FormulaError> {
    let path = installed_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(&path))?;
    }
    let json = serde_json::to_string_pretty(record).map_err(|source| {
        FormulaError::InstalledJson { path: path.display().to_string(), source }
    })?;
    std::fs::write(&path, json).map_err(io_err(&path))
}

/// First-run provisioning: write each embedded formula that has no file
/// yet and record its hash. Existing files are left untouched.
pub fn provision(root: &Path, embedded: &[EmbeddedFormula]) -> Result<usize, FormulaError> {
    let mut record = load_record(root)?;
    let mut installed = 0;
    for formula in embedded {
        let path = formula_path(root, formula.name);
        if path.exists() {
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(&path))?;
        }
        std::fs::write(&path, formula.content).map_err(io_err(&path))?;
        record.formulas.insert(formula.name.to_string(), sha256_hex(formula.content));
        installed += 1;
    }
    if installed > 0 {
        save_record(root, &record)?;
    }
    Ok(installed)
}

/// Classify every embedded formula, plus files the record does not track.
pub fn health_check(
    root: &Path,
    embedded: &[EmbeddedFormula],
) -> Result<BTreeMap<String, FormulaHealth>, FormulaError> {
    let record = load_record(root)?;
    let mut out = BTreeMap::new();

    for formula in embedded {
        let path = formula_path(root, formula.name);
        let file = std::fs::read_to_string(&path).ok();
        let installed_hash = record.formulas.get(formula.name);
        let health = match (installed_hash, file) {
            (None, None) => FormulaHealth::New,
            (None, Some(_)) => FormulaHealth::Untracked,
            (Some(_), None) => FormulaHealth::Missing,
            (Some(hash), Some(content)) => {
                if sha256_hex(&content) != *hash {
                    FormulaHealth::Modified
                } else if sha256_hex(formula.content) != *hash {
                    FormulaHealth::Outdated
                } else {
                    FormulaHealth::Ok
                }
            }
        };
        out.insert(formula.name.to_string(), health);
    }

    // Files on disk with no embedded counterpart and no record entry
    if let Ok(entries) = std::fs::read_dir(formulas_dir(root)) {
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().to_string();
            let Some(name) = file_name.strip_suffix(".formula.toml") else {
                continue;
            };
            if !out.contains_key(name) && !record.formulas.contains_key(name) {
                out.insert(name.to_string(), FormulaHealth::Untracked);
            }
        }
    }
    Ok(out)
}

/// Bring tracked formulas current: install `new`, `outdated`, `missing`,
/// and `untracked`; never touch `modified`. Returns the updated names.
pub fn update(root: &Path, embedded: &[EmbeddedFormula]) -> Result<Vec<String>, FormulaError> {
    let health = health_check(root, embedded)?;
    let mut record = load_record(root)?;
    let mut updated = Vec::new();

    for formula in embedded {
        let health = health.get(formula.name).copied().unwrap_or(FormulaHealth::New);
        match health {
            FormulaHealth::New
            | FormulaHealth::Outdated
            | FormulaHealth::Missing
            | FormulaHealth::Untracked => {
                let path = formula_path(root, formula.name);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(io_err(&path))?;
                }
                std::fs::write(&path, formula.content).map_err(io_err(&path))?;
                record.formulas.insert(formula.name.to_string(), sha256_hex(formula.content));
                updated.push(formula.name.to_string());
            }
            FormulaHealth::Modified | FormulaHealth::Ok => {}
        }
    }

    if !updated.is_empty() {
        save_record(root, &record)?;
    }
    Ok(updated)
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
