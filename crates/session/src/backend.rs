// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session backend seam.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::SessionError;

/// Everything needed to start one agent session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSpec {
    pub name: String,
    /// Command launched in the session (the agent CLI).
    pub command: String,
    pub workdir: PathBuf,
    pub env: BTreeMap<String, String>,
}

/// Terminal-multiplexer operations the supervisor relies on.
///
/// Aliveness is observation, never bookkeeping: `exists`/`list` ask the
/// multiplexer, because sessions outlive supervisor restarts.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn create(&self, spec: &SessionSpec) -> Result<(), SessionError>;

    async fn kill(&self, name: &str) -> Result<(), SessionError>;

    async fn exists(&self, name: &str) -> Result<bool, SessionError>;

    async fn list(&self) -> Result<Vec<String>, SessionError>;

    /// Creation time in epoch seconds, `None` when the session is gone.
    async fn created_at(&self, name: &str) -> Result<Option<u64>, SessionError>;

    /// Type text into the session followed by Enter.
    async fn send_input(&self, name: &str, text: &str) -> Result<(), SessionError>;
}
