// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const WORKFLOW: &str = r#"
name = "ship-feature"
type = "workflow"
description = "design, build, review"

[[steps]]
id = "design"

[[steps]]
id = "implement"
needs = ["design"]

[[steps]]
id = "review"
needs = ["implement"]
"#;

#[test]
fn workflow_parses() {
    let formula = Formula::parse(WORKFLOW).unwrap();
    assert_eq!(formula.name, "ship-feature");
    assert_eq!(formula.kind, FormulaType::Workflow);
    assert_eq!(formula.steps.len(), 3);
    assert_eq!(formula.steps[1].needs, vec!["design".to_string()]);
}

#[test]
fn convoy_with_synthesis_parses() {
    let formula = Formula::parse(
        r#"
name = "parallel-audit"
type = "convoy"

[[legs]]
id = "audit-core"

[[legs]]
id = "audit-cli"

[synthesis]
id = "report"
depends_on = ["audit-core", "audit-cli"]
"#,
    )
    .unwrap();
    assert_eq!(formula.kind, FormulaType::Convoy);
    assert_eq!(formula.legs.len(), 2);
    assert_eq!(formula.synthesis.as_ref().unwrap().depends_on.len(), 2);
}

#[test]
fn empty_name_rejected() {
    let err = Formula::parse("name = \"\"\ntype = \"workflow\"\n").unwrap_err();
    assert!(matches!(err, FormulaError::EmptyName));
}

#[test]
fn invalid_type_rejected() {
    let err = Formula::parse("name = \"x\"\ntype = \"sorcery\"\n").unwrap_err();
    assert!(matches!(err, FormulaError::Toml(_)));
}

#[test]
fn duplicate_step_id_rejected() {
    let err = Formula::parse(
        "name = \"x\"\ntype = \"workflow\"\n[[steps]]\nid = \"a\"\n[[steps]]\nid = \"a\"\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FormulaError::DuplicateId { category: "step", ref id } if id == "a"
    ));
}

#[test]
fn unknown_dependency_rejected() {
    let err = Formula::parse(
        "name = \"x\"\ntype = \"workflow\"\n[[steps]]\nid = \"a\"\nneeds = [\"ghost\"]\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FormulaError::UnknownDependency { ref dep, .. } if dep == "ghost"
    ));
}

#[test]
fn synthesis_must_reference_known_legs() {
    let err = Formula::parse(
        r#"
name = "x"
type = "convoy"
[[legs]]
id = "a"
[synthesis]
id = "s"
depends_on = ["ghost"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, FormulaError::UnknownDependency { category: "synthesis", .. }));
}

#[test]
fn cycle_detected_with_offending_step() {
    let err = Formula::parse(
        r#"
name = "x"
type = "workflow"
[[steps]]
id = "a"
needs = ["b"]
[[steps]]
id = "b"
needs = ["a"]
"#,
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(
        message.starts_with("cycle detected involving step: "),
        "unexpected message: {message}"
    );
}

#[test]
fn self_cycle_detected() {
    let err = Formula::parse(
        "name = \"x\"\ntype = \"workflow\"\n[[steps]]\nid = \"a\"\nneeds = [\"a\"]\n",
    )
    .unwrap_err();
    assert!(matches!(err, FormulaError::Cycle(ref id) if id == "a"));
}

#[test]
fn formula_roundtrips_through_json() {
    // Catalog layers carry formulas as JSON lines
    let formula = Formula::parse(WORKFLOW).unwrap();
    let json = serde_json::to_string(&formula).unwrap();
    let parsed: Formula = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, formula);
}
