// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway and store errors.

use gt_core::error::{Classify, ErrorKind};
use gt_core::identity::IdentityError;

#[derive(Debug, thiserror::Error)]
pub enum BeadsError {
    /// The store reported that the record does not exist.
    #[error("bead not found: {0}")]
    NotFound(String),

    /// The store refused a create because the ID already exists.
    #[error("bead already exists: {0}")]
    Duplicate(String),

    /// Any other non-zero exit from the store CLI.
    #[error("bd {op} failed: {output}")]
    Store { op: String, output: String },

    #[error("failed to spawn bd: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("bad JSON from bd {op}: {source}")]
    Json {
        op: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The gateway was shut down while a caller waited on the semaphore.
    #[error("store gateway closed")]
    Closed,

    /// A record's envelope is missing a field the typed store requires.
    #[error("malformed {entity} record {id}: missing {field}")]
    Malformed {
        entity: &'static str,
        id: String,
        field: &'static str,
    },

    /// Merge-slot release by a non-holder.
    #[error("merge slot held by {holder:?}, not {caller:?}")]
    NotHolder { holder: String, caller: String },
}

impl Classify for BeadsError {
    fn kind(&self) -> ErrorKind {
        match self {
            BeadsError::NotFound(_) => ErrorKind::NotFound,
            BeadsError::Duplicate(_) => ErrorKind::Duplicate,
            BeadsError::Identity(_) => ErrorKind::InvalidIdentity,
            BeadsError::NotHolder { .. } => ErrorKind::PermissionDenied,
            BeadsError::Closed => ErrorKind::Cancelled,
            BeadsError::Malformed { .. } => ErrorKind::InvalidConfig,
            BeadsError::Store { .. } | BeadsError::Spawn(_) | BeadsError::Json { .. } => {
                ErrorKind::ExternalStore
            }
        }
    }
}
