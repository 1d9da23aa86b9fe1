// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-formula: the hierarchical template catalog.
//!
//! Formulas are TOML DAGs of work (workflows, convoys, expansions,
//! aspects). The catalog layers town → rig → project with later sources
//! overriding by name; the installer tracks embedded formulas by content
//! hash so user edits are never clobbered.

pub mod catalog;
pub mod dag;
pub mod error;
pub mod install;
pub mod types;

pub use catalog::Catalog;
pub use dag::{ready_steps, topological_sort};
pub use error::FormulaError;
pub use install::{health_check, provision, update, EmbeddedFormula, FormulaHealth};
pub use types::{Formula, FormulaType, Step};
