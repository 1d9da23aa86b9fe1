// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gt_core::error::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("worker name already in use: {0}")]
    NameTaken(String),

    #[error("worker not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Beads(#[from] gt_beads::BeadsError),

    #[error(transparent)]
    Session(#[from] gt_session::SessionError),

    #[error(transparent)]
    Identity(#[from] gt_core::IdentityError),

    #[error("worktree {op} failed for {path}: {detail}")]
    Worktree {
        op: &'static str,
        path: String,
        detail: String,
    },

    #[error("state file {path}: {source}")]
    StateIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path}: {source}")]
    StateJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Classify for RegistryError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NameTaken(_) => ErrorKind::Duplicate,
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Beads(e) => e.kind(),
            RegistryError::Session(e) => e.kind(),
            RegistryError::Identity(_) => ErrorKind::InvalidIdentity,
            RegistryError::Worktree { .. } => ErrorKind::Worktree,
            RegistryError::StateIo { .. } | RegistryError::StateJson { .. } => {
                ErrorKind::ExternalStore
            }
        }
    }
}
