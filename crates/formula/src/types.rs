// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Formula types and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::FormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaType {
    /// Sequential/parallel steps ordered by `needs`
    Workflow,
    /// Parallel legs plus an optional synthesis step
    Convoy,
    /// Templates stamped out in dependency order
    Expansion,
    /// Independent parallel aspects
    Aspect,
}

impl FormulaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaType::Workflow => "workflow",
            FormulaType::Convoy => "convoy",
            FormulaType::Expansion => "expansion",
            FormulaType::Aspect => "aspect",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    pub id: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FormulaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<Leg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<Synthesis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aspects: Vec<Leg>,
}

impl Formula {
    /// Parse and validate a `.formula.toml` document.
    pub fn parse(text: &str) -> Result<Formula, FormulaError> {
        let formula: Formula = toml::from_str(text)?;
        formula.validate()?;
        Ok(formula)
    }

    /// Structural checks: non-empty name, unique ids per category, every
    /// dependency known, no cycles.
    pub fn validate(&self) -> Result<(), FormulaError> {
        if self.name.trim().is_empty() {
            return Err(FormulaError::EmptyName);
        }

        check_unique("step", self.steps.iter().map(|s| s.id.as_str()))?;
        check_unique("leg", self.legs.iter().map(|l| l.id.as_str()))?;
        check_unique("template", self.templates.iter().map(|t| t.id.as_str()))?;
        check_unique("aspect", self.aspects.iter().map(|a| a.id.as_str()))?;

        check_dag("step", &self.dag_nodes(&self.steps))?;
        check_dag("template", &self.dag_nodes(&self.templates))?;

        if let Some(ref synthesis) = self.synthesis {
            let leg_ids: HashSet<&str> = self.legs.iter().map(|l| l.id.as_str()).collect();
            for dep in &synthesis.depends_on {
                if !leg_ids.contains(dep.as_str()) {
                    return Err(FormulaError::UnknownDependency {
                        category: "synthesis",
                        id: synthesis.id.clone(),
                        dep: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn dag_nodes<'a>(&self, steps: &'a [Step]) -> Vec<(&'a str, &'a [String])> {
        steps.iter().map(|s| (s.id.as_str(), s.needs.as_slice())).collect()
    }
}

fn check_unique<'a>(
    category: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), FormulaError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(FormulaError::DuplicateId { category, id: id.to_string() });
        }
    }
    Ok(())
}

/// Unknown-reference and cycle (DFS) checks over (id, needs) nodes.
fn check_dag(category: &'static str, nodes: &[(&str, &[String])]) -> Result<(), FormulaError> {
    let ids: HashSet<&str> = nodes.iter().map(|(id, _)| *id).collect();
    for (id, needs) in nodes {
        for dep in *needs {
            if !ids.contains(dep.as_str()) {
                return Err(FormulaError::UnknownDependency {
                    category,
                    id: id.to_string(),
                    dep: dep.clone(),
                });
            }
        }
    }

    // DFS colouring; a grey → grey edge is a back edge
    let index: std::collections::HashMap<&str, usize> =
        nodes.iter().enumerate().map(|(i, (id, _))| (*id, i)).collect();
    let mut colour = vec![Colour::White; nodes.len()];
    for start in 0..nodes.len() {
        if colour[start] == Colour::White {
            dfs(start, nodes, &index, &mut colour)?;
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Colour {
    White,
    Grey,
    Black,
}

fn dfs(
    node: usize,
    nodes: &[(&str, &[String])],
    index: &std::collections::HashMap<&str, usize>,
    colour: &mut [Colour],
) -> Result<(), FormulaError> {
    colour[node] = Colour::Grey;
    for dep in nodes[node].1 {
        let Some(&dep_index) = index.get(dep.as_str()) else {
            continue;
        };
        match colour[dep_index] {
            Colour::Grey => return Err(FormulaError::Cycle(dep.clone())),
            Colour::White => dfs(dep_index, nodes, index, colour)?,
            Colour::Black => {}
        }
    }
    colour[node] = Colour::Black;
    Ok(())
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
