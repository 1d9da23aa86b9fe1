// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gt_core::error::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error(transparent)]
    Store(#[from] gt_beads::BeadsError),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("slot file {path}: {source}")]
    SlotIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("slot file {path}: {source}")]
    SlotJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Classify for MailError {
    fn kind(&self) -> ErrorKind {
        match self {
            MailError::Store(e) => e.kind(),
            MailError::GroupNotFound(_) => ErrorKind::NotFound,
            MailError::SlotIo { .. } | MailError::SlotJson { .. } => ErrorKind::ExternalStore,
        }
    }
}
