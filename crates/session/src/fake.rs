// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory session backend for tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::{SessionBackend, SessionSpec};
use crate::error::SessionError;

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub spec: SessionSpec,
    pub created_at: u64,
    pub inputs: Vec<String>,
}

/// Fake backend: sessions are map entries, input is appended to a log.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    sessions: BTreeMap<String, FakeSession>,
    now: u64,
    kills: Vec<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the fake epoch-seconds clock used for creation stamps.
    pub fn advance_secs(&self, secs: u64) {
        self.inner.lock().now += secs;
    }

    pub fn session(&self, name: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(name).cloned()
    }

    pub fn inputs(&self, name: &str) -> Vec<String> {
        self.session(name).map(|s| s.inputs).unwrap_or_default()
    }

    /// Names passed to kill, in order (including repeats).
    pub fn kills(&self) -> Vec<String> {
        self.inner.lock().kills.clone()
    }

    /// Drop a session behind the supervisor's back (crash simulation).
    pub fn vanish(&self, name: &str) {
        self.inner.lock().sessions.remove(name);
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn create(&self, spec: &SessionSpec) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.sessions.contains_key(&spec.name) {
            return Err(SessionError::Backend {
                op: "new-session",
                session: spec.name.clone(),
                output: "duplicate session".to_string(),
            });
        }
        let created_at = inner.now;
        inner.sessions.insert(
            spec.name.clone(),
            FakeSession { spec: spec.clone(), created_at, inputs: vec![] },
        );
        Ok(())
    }

    async fn kill(&self, name: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.kills.push(name.to_string());
        inner.sessions.remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, SessionError> {
        Ok(self.inner.lock().sessions.contains_key(name))
    }

    async fn list(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.inner.lock().sessions.keys().cloned().collect())
    }

    async fn created_at(&self, name: &str) -> Result<Option<u64>, SessionError> {
        Ok(self.inner.lock().sessions.get(name).map(|s| s.created_at))
    }

    async fn send_input(&self, name: &str, text: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(name) {
            Some(session) => {
                session.inputs.push(text.to_string());
                Ok(())
            }
            None => Err(SessionError::NotFound(name.to_string())),
        }
    }
}
