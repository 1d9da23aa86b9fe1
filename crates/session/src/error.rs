// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gt_core::error::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("tmux {op} failed for {session}: {output}")]
    Backend {
        op: &'static str,
        session: String,
        output: String,
    },

    #[error("failed to run tmux: {0}")]
    Spawn(#[from] std::io::Error),
}

impl Classify for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::Backend { .. } | SessionError::Spawn(_) => ErrorKind::Session,
        }
    }
}
