// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux process utilities.
//!
//! Targets always use the `=` exact-match anchor: tmux's bare `-t` does
//! prefix matching, and rig session names are prefixes of each other
//! (`gt-gastown-nux` vs `gt-gastown-nux2`).

use async_trait::async_trait;

use crate::backend::{SessionBackend, SessionSpec};
use crate::error::SessionError;

#[derive(Debug, Clone)]
pub struct TmuxBackend {
    bin: String,
}

impl TmuxBackend {
    pub fn new() -> Self {
        Self { bin: "tmux".to_string() }
    }

    async fn run(&self, op: &'static str, session: &str, args: &[&str]) -> Result<String, SessionError> {
        let output = tokio::process::Command::new(&self.bin).args(args).output().await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).to_string());
        }
        Err(SessionError::Backend {
            op,
            session: session.to_string(),
            output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn target(name: &str) -> String {
        format!("={name}")
    }
}

impl Default for TmuxBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionBackend for TmuxBackend {
    async fn create(&self, spec: &SessionSpec) -> Result<(), SessionError> {
        let workdir = spec.workdir.display().to_string();
        let mut args: Vec<String> = vec![
            "new-session".into(),
            "-d".into(),
            "-s".into(),
            spec.name.clone(),
            "-c".into(),
            workdir,
        ];
        for (key, value) in &spec.env {
            args.push("-e".into());
            args.push(format!("{key}={value}"));
        }
        if !spec.command.is_empty() {
            args.push(spec.command.clone());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run("new-session", &spec.name, &arg_refs).await?;
        Ok(())
    }

    async fn kill(&self, name: &str) -> Result<(), SessionError> {
        let target = Self::target(name);
        match self.run("kill-session", name, &["kill-session", "-t", &target]).await {
            Ok(_) => Ok(()),
            // Killing a session that is already gone is a success
            Err(SessionError::Backend { output, .. }) if output.contains("can't find") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, SessionError> {
        let target = Self::target(name);
        match self.run("has-session", name, &["has-session", "-t", &target]).await {
            Ok(_) => Ok(true),
            Err(SessionError::Backend { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list(&self) -> Result<Vec<String>, SessionError> {
        let stdout = match self
            .run("list-sessions", "", &["list-sessions", "-F", "#{session_name}"])
            .await
        {
            Ok(stdout) => stdout,
            // No server running means no sessions
            Err(SessionError::Backend { output, .. }) if output.contains("no server") => {
                return Ok(vec![])
            }
            Err(e) => return Err(e),
        };
        Ok(stdout.lines().map(str::to_string).filter(|s| !s.is_empty()).collect())
    }

    async fn created_at(&self, name: &str) -> Result<Option<u64>, SessionError> {
        let target = Self::target(name);
        let result = self
            .run(
                "display-message",
                name,
                &["display-message", "-p", "-t", &target, "#{session_created}"],
            )
            .await;
        match result {
            Ok(stdout) => Ok(stdout.trim().parse().ok()),
            Err(SessionError::Backend { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send_input(&self, name: &str, text: &str) -> Result<(), SessionError> {
        let target = Self::target(name);
        // Literal text first, then Enter as a separate key press
        self.run("send-keys", name, &["send-keys", "-t", &target, "-l", text]).await?;
        self.run("send-keys", name, &["send-keys", "-t", &target, "Enter"]).await?;
        Ok(())
    }
}
