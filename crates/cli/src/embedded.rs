// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Formulas shipped with the binary.

use gt_formula::EmbeddedFormula;

/// The baseline polecat workflow every town starts with.
const POLECAT_WORK: &str = r#"name = "polecat-work"
type = "workflow"
description = "Take hooked work to a reviewed merge"

[[steps]]
id = "implement"

[[steps]]
id = "file-mr"
needs = ["implement"]

[[steps]]
id = "report-done"
needs = ["file-mr"]
"#;

pub const EMBEDDED: &[EmbeddedFormula] =
    &[EmbeddedFormula { name: "polecat-work", content: POLECAT_WORK }];
