// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const V1: &str = "name = \"ship\"\ntype = \"workflow\"\n[[steps]]\nid = \"go\"\n";
const V2: &str = "name = \"ship\"\ntype = \"workflow\"\n[[steps]]\nid = \"go\"\n# v2\n";

fn ship(content: &'static str) -> EmbeddedFormula {
    EmbeddedFormula { name: "ship", content }
}

#[test]
fn provision_installs_absent_formulas_once() {
    let root = tempfile::tempdir().unwrap();
    assert_eq!(provision(root.path(), &[ship(V1)]).unwrap(), 1);
    let path = root.path().join(".beads/formulas/ship.formula.toml");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), V1);

    // Second provision is a no-op
    assert_eq!(provision(root.path(), &[ship(V1)]).unwrap(), 0);
}

#[test]
fn health_ok_after_provision() {
    let root = tempfile::tempdir().unwrap();
    provision(root.path(), &[ship(V1)]).unwrap();
    let health = health_check(root.path(), &[ship(V1)]).unwrap();
    assert_eq!(health.get("ship"), Some(&FormulaHealth::Ok));
}

#[test]
fn embedded_change_reads_as_outdated() {
    let root = tempfile::tempdir().unwrap();
    provision(root.path(), &[ship(V1)]).unwrap();
    let health = health_check(root.path(), &[ship(V2)]).unwrap();
    assert_eq!(health.get("ship"), Some(&FormulaHealth::Outdated));
}

#[test]
fn user_edit_reads_as_modified() {
    let root = tempfile::tempdir().unwrap();
    provision(root.path(), &[ship(V1)]).unwrap();
    let path = root.path().join(".beads/formulas/ship.formula.toml");
    std::fs::write(&path, "name = \"ship\"\ntype = \"workflow\"\n# my tweak\n").unwrap();
    let health = health_check(root.path(), &[ship(V2)]).unwrap();
    assert_eq!(health.get("ship"), Some(&FormulaHealth::Modified));
}

#[test]
fn deleted_file_reads_as_missing() {
    let root = tempfile::tempdir().unwrap();
    provision(root.path(), &[ship(V1)]).unwrap();
    std::fs::remove_file(root.path().join(".beads/formulas/ship.formula.toml")).unwrap();
    let health = health_check(root.path(), &[ship(V1)]).unwrap();
    assert_eq!(health.get("ship"), Some(&FormulaHealth::Missing));
}

#[test]
fn never_installed_reads_as_new() {
    let root = tempfile::tempdir().unwrap();
    let health = health_check(root.path(), &[ship(V1)]).unwrap();
    assert_eq!(health.get("ship"), Some(&FormulaHealth::New));
}

#[test]
fn unrecorded_file_reads_as_untracked() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join(".beads/formulas");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("ship.formula.toml"), V1).unwrap();
    std::fs::write(dir.join("stray.formula.toml"), "whatever").unwrap();

    let health = health_check(root.path(), &[ship(V1)]).unwrap();
    assert_eq!(health.get("ship"), Some(&FormulaHealth::Untracked));
    assert_eq!(health.get("stray"), Some(&FormulaHealth::Untracked));
}

#[test]
fn update_refreshes_everything_except_modified() {
    let root = tempfile::tempdir().unwrap();
    let keep = EmbeddedFormula { name: "keep", content: V1 };
    let drift = EmbeddedFormula { name: "drift", content: V1 };
    provision(root.path(), &[keep, drift]).unwrap();

    // User edits `keep`; upstream moves both to V2
    let keep_path = root.path().join(".beads/formulas/keep.formula.toml");
    std::fs::write(&keep_path, "user edit\n").unwrap();

    let keep_v2 = EmbeddedFormula { name: "keep", content: V2 };
    let drift_v2 = EmbeddedFormula { name: "drift", content: V2 };
    let updated = update(root.path(), &[keep_v2, drift_v2]).unwrap();

    assert_eq!(updated, vec!["drift".to_string()]);
    assert_eq!(std::fs::read_to_string(&keep_path).unwrap(), "user edit\n");
    let drift_path = root.path().join(".beads/formulas/drift.formula.toml");
    assert_eq!(std::fs::read_to_string(&drift_path).unwrap(), V2);
}

#[test]
fn update_reinstalls_missing_and_new() {
    let root = tempfile::tempdir().unwrap();
    provision(root.path(), &[ship(V1)]).unwrap();
    std::fs::remove_file(root.path().join(".beads/formulas/ship.formula.toml")).unwrap();

    let fresh = EmbeddedFormula { name: "fresh", content: V1 };
    let updated = update(root.path(), &[ship(V1), fresh]).unwrap();
    assert_eq!(updated, vec!["ship".to_string(), "fresh".to_string()]);
    assert!(root.path().join(".beads/formulas/ship.formula.toml").exists());
    assert!(root.path().join(".beads/formulas/fresh.formula.toml").exists());
}
