// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Component crates define their own `thiserror` enums; each exposes a
//! [`kind`](ErrorKind) so callers can branch on the class of failure
//! (create-or-reopen hinges on `Duplicate`, patrols on `NotFound`) without
//! depending on the component's internal variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of a failure as it crosses a component boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Duplicate,
    InvalidIdentity,
    InvalidConfig,
    ExternalStore,
    Session,
    Worktree,
    PermissionDenied,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::InvalidIdentity => "invalid identity",
            ErrorKind::InvalidConfig => "invalid config",
            ErrorKind::ExternalStore => "external store failure",
            ErrorKind::Session => "session failure",
            ErrorKind::Worktree => "worktree failure",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Implemented by component error enums so boundary code can classify
/// failures without matching on foreign variants.
pub trait Classify {
    fn kind(&self) -> ErrorKind;

    fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    fn is_duplicate(&self) -> bool {
        self.kind() == ErrorKind::Duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not found");
        assert_eq!(ErrorKind::ExternalStore.to_string(), "external store failure");
    }

    #[test]
    fn kind_serde_snake_case() {
        let json = serde_json::to_string(&ErrorKind::PermissionDenied).unwrap();
        assert_eq!(json, "\"permission_denied\"");
    }
}
