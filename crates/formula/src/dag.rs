// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG scheduling over validated formulas.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::FormulaError;
use crate::types::Step;

/// Kahn's algorithm. Ties break by declaration order, so the result is
/// deterministic for a given formula.
pub fn topological_sort(steps: &[Step]) -> Result<Vec<String>, FormulaError> {
    let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    let id_set: HashSet<&str> = ids.iter().copied().collect();

    let mut in_degree: HashMap<&str, usize> = ids.iter().map(|id| (*id, 0)).collect();
    // id → steps that need it
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in steps {
        for need in &step.needs {
            if !id_set.contains(need.as_str()) {
                return Err(FormulaError::UnknownDependency {
                    category: "step",
                    id: step.id.clone(),
                    dep: need.clone(),
                });
            }
            *in_degree.entry(step.id.as_str()).or_default() += 1;
            dependents.entry(need.as_str()).or_default().push(step.id.as_str());
        }
    }

    let mut queue: VecDeque<&str> =
        ids.iter().copied().filter(|id| in_degree[id] == 0).collect();
    let mut order = Vec::with_capacity(steps.len());

    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        for &dependent in dependents.get(id).into_iter().flatten() {
            let degree = in_degree.entry(dependent).or_default();
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if order.len() != steps.len() {
        // Some step never reached zero in-degree: it sits on a cycle
        let stuck = ids
            .iter()
            .find(|id| !order.iter().any(|o| o.as_str() == **id))
            .copied()
            .unwrap_or_default();
        return Err(FormulaError::Cycle(stuck.to_string()));
    }
    Ok(order)
}

/// Steps whose needs are all completed and which are not themselves done.
pub fn ready_steps(steps: &[Step], completed: &HashSet<String>) -> Vec<String> {
    steps
        .iter()
        .filter(|s| !completed.contains(&s.id))
        .filter(|s| s.needs.iter().all(|n| completed.contains(n)))
        .map(|s| s.id.clone())
        .collect()
}

#[cfg(test)]
#[path = "dag_tests.rs"]
mod tests;
