// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("invalid formula TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid molecule JSON at {path} line {line}: {source}")]
    MoleculeJson {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("formula name must not be empty")]
    EmptyName,

    #[error("duplicate {category} id: {id}")]
    DuplicateId { category: &'static str, id: String },

    #[error("{category} {id} depends on unknown id: {dep}")]
    UnknownDependency {
        category: &'static str,
        id: String,
        dep: String,
    },

    #[error("cycle detected involving step: {0}")]
    Cycle(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("installed record {path}: {source}")]
    InstalledJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
