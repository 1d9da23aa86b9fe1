// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gt_core::error::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("another daemon holds {0}")]
    PidLocked(String),

    #[error(transparent)]
    Beads(#[from] gt_beads::BeadsError),

    #[error(transparent)]
    Mail(#[from] gt_mail::MailError),

    #[error(transparent)]
    Session(#[from] gt_session::SessionError),

    #[error(transparent)]
    Registry(#[from] gt_registry::RegistryError),

    #[error(transparent)]
    Config(#[from] gt_core::config::ConfigError),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Classify for DaemonError {
    fn kind(&self) -> ErrorKind {
        match self {
            DaemonError::PidLocked(_) => ErrorKind::Duplicate,
            DaemonError::Beads(e) => e.kind(),
            DaemonError::Mail(e) => e.kind(),
            DaemonError::Session(e) => e.kind(),
            DaemonError::Registry(e) => e.kind(),
            DaemonError::Config(_) => ErrorKind::InvalidConfig,
            DaemonError::Io { .. } | DaemonError::Json { .. } => ErrorKind::ExternalStore,
        }
    }
}
