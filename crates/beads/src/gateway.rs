// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single point through which every record is created, queried, or
//! mutated.
//!
//! The underlying store uses file-level locks that deadlock beyond a small
//! fan-in, so every CLI invocation passes through a three-permit semaphore.
//! Creates are routed by ID prefix: `.beads/routes.jsonl` at the town root
//! maps prefix → rig path, an optional `.beads/redirect` forwards a target,
//! and multi-hyphen IDs carry `--force` past the store's prefix-inference
//! heuristic.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::Semaphore;

use gt_core::identity::needs_force;

use crate::error::BeadsError;
use crate::record::Bead;

/// Store CLI fan-in bound. The store's file locks wedge beyond this.
pub const STORE_CONCURRENCY: usize = 3;

/// Sentinel dropped next to a store once custom types are registered.
const TYPES_SENTINEL: &str = ".beads/.gt-types-ok";

/// Captured output of one store CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { code: 0, stdout: stdout.into(), stderr: String::new() }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self { code, stdout: String::new(), stderr: stderr.into() }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// stdout and stderr joined and trimmed, for error context.
    pub fn combined(&self) -> String {
        let mut s = String::new();
        s.push_str(self.stdout.trim());
        if !self.stderr.trim().is_empty() {
            if !s.is_empty() {
                s.push('\n');
            }
            s.push_str(self.stderr.trim());
        }
        s
    }
}

/// Executes one store CLI invocation. The real runner shells out to `bd`;
/// tests script a fake.
#[async_trait]
pub trait BeadsRunner: Send + Sync {
    async fn run(&self, args: &[String], cwd: &Path) -> std::io::Result<RunOutput>;
}

/// Shells out to the store binary with the given working directory.
#[derive(Debug, Clone)]
pub struct ExecRunner {
    bin: String,
}

impl ExecRunner {
    pub fn new() -> Self {
        Self { bin: "bd".to_string() }
    }

    pub fn with_bin(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for ExecRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BeadsRunner for ExecRunner {
    async fn run(&self, args: &[String], cwd: &Path) -> std::io::Result<RunOutput> {
        let output = tokio::process::Command::new(&self.bin)
            .args(args)
            .current_dir(cwd)
            .output()
            .await?;
        Ok(RunOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Scripted runner for tests: pops queued responses, records every call.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeRunner {
    responses: Mutex<std::collections::VecDeque<RunOutput>>,
    calls: Mutex<Vec<(Vec<String>, PathBuf)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, output: RunOutput) {
        self.responses.lock().push_back(output);
    }

    pub fn push_ok(&self, stdout: impl Into<String>) {
        self.push(RunOutput::ok(stdout));
    }

    pub fn push_failure(&self, code: i32, stderr: impl Into<String>) {
        self.push(RunOutput::failure(code, stderr));
    }

    /// Every invocation so far as (args, cwd).
    pub fn calls(&self) -> Vec<(Vec<String>, PathBuf)> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl BeadsRunner for FakeRunner {
    async fn run(&self, args: &[String], cwd: &Path) -> std::io::Result<RunOutput> {
        self.calls.lock().push((args.to_vec(), cwd.to_path_buf()));
        if let Some(output) = self.responses.lock().pop_front() {
            return Ok(output);
        }
        // Unscripted reads still need parseable output: a minimal record
        // for `show`, an empty listing otherwise.
        if args.first().map(String::as_str) == Some("show") {
            let id = args.get(1).cloned().unwrap_or_default();
            return Ok(RunOutput::ok(format!("{{\"id\": \"{id}\"}}")));
        }
        Ok(RunOutput::ok(""))
    }
}

/// One line of `.beads/routes.jsonl`.
#[derive(Debug, Deserialize)]
struct Route {
    prefix: String,
    path: String,
}

/// Fields for a record create.
#[derive(Debug, Clone, Default)]
pub struct CreateSpec {
    pub id: String,
    pub title: String,
    pub description: String,
    pub issue_type: String,
    pub labels: Vec<String>,
}

/// Mutable fields for a record update. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// The store gateway. One per process, owned by the supervisor and passed
/// by reference; the semaphore only bounds fan-in when shared.
pub struct Gateway<R> {
    runner: R,
    town_root: PathBuf,
    semaphore: Semaphore,
    types_ready: Mutex<HashSet<PathBuf>>,
}

impl<R: BeadsRunner> Gateway<R> {
    pub fn new(runner: R, town_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            town_root: town_root.into(),
            semaphore: Semaphore::new(STORE_CONCURRENCY),
            types_ready: Mutex::new(HashSet::new()),
        }
    }

    pub fn town_root(&self) -> &Path {
        &self.town_root
    }

    /// Run the store CLI at the town root.
    pub async fn run(&self, args: &[&str]) -> Result<RunOutput, BeadsError> {
        let cwd = self.town_root.clone();
        self.run_in(&cwd, args).await
    }

    /// Run the store CLI with an explicit working directory.
    ///
    /// This is the semaphore choke point; nothing holds a permit across
    /// another `run_in` call.
    pub async fn run_in(&self, cwd: &Path, args: &[&str]) -> Result<RunOutput, BeadsError> {
        let _permit = self.semaphore.acquire().await.map_err(|_| BeadsError::Closed)?;
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let output = self.runner.run(&args, cwd).await?;
        if output.success() {
            return Ok(output);
        }
        let op = args.first().cloned().unwrap_or_default();
        Err(map_failure(&op, &output))
    }

    /// Resolve the working directory for records with the given prefix.
    ///
    /// Looks up `.beads/routes.jsonl` at the town root, then follows
    /// `.beads/redirect` on the target. Unknown prefixes fall back to the
    /// town root (the store there owns unrouted prefixes).
    pub fn resolve_prefix(&self, prefix: &str) -> PathBuf {
        let routes_path = self.town_root.join(".beads/routes.jsonl");
        let target = match std::fs::read_to_string(&routes_path) {
            Ok(text) => text
                .lines()
                .filter_map(|line| serde_json::from_str::<Route>(line).ok())
                .find(|r| r.prefix == prefix)
                .map(|r| self.town_root.join(r.path)),
            Err(_) => None,
        };
        let target = match target {
            Some(t) => t,
            None => {
                tracing::debug!(prefix, "no route; using town root");
                self.town_root.clone()
            }
        };
        follow_redirect(target)
    }

    /// Create a record, routed by its prefix.
    pub async fn create(&self, spec: &CreateSpec) -> Result<(), BeadsError> {
        let prefix = gt_core::identity::extract_prefix(&spec.id).to_string();
        let target = self.resolve_prefix(&prefix);
        self.ensure_types(&target).await?;

        let mut args: Vec<&str> = vec!["create", "--id", &spec.id, "--title", &spec.title];
        if !spec.issue_type.is_empty() {
            args.push("--type");
            args.push(&spec.issue_type);
        }
        args.push("--description");
        args.push(&spec.description);
        for label in &spec.labels {
            args.push("--label");
            args.push(label);
        }
        if needs_force(&spec.id) {
            args.push("--force");
        }
        self.run_in(&target, &args).await.map_err(|e| match e {
            // Attach the offending ID; the raw CLI message rarely echoes it
            BeadsError::Duplicate(_) => BeadsError::Duplicate(spec.id.clone()),
            other => other,
        })?;
        Ok(())
    }

    pub async fn show(&self, id: &str) -> Result<Bead, BeadsError> {
        let output = self.run(&["show", id, "--json"]).await.map_err(|e| match e {
            BeadsError::NotFound(_) => BeadsError::NotFound(id.to_string()),
            other => other,
        })?;
        serde_json::from_str(&output.stdout)
            .map_err(|source| BeadsError::Json { op: "show".into(), source })
    }

    /// List records matching every given label, optionally by status.
    pub async fn list(&self, labels: &[&str], status: Option<&str>) -> Result<Vec<Bead>, BeadsError> {
        let mut args: Vec<&str> = vec!["list", "--json"];
        for label in labels {
            args.push("--label");
            args.push(label);
        }
        if let Some(status) = status {
            args.push("--status");
            args.push(status);
        }
        let output = self.run(&args).await?;
        if output.stdout.trim().is_empty() {
            return Ok(vec![]);
        }
        serde_json::from_str(&output.stdout)
            .map_err(|source| BeadsError::Json { op: "list".into(), source })
    }

    pub async fn update(&self, id: &str, spec: &UpdateSpec) -> Result<(), BeadsError> {
        let mut args: Vec<&str> = vec!["update", id];
        if let Some(ref title) = spec.title {
            args.push("--title");
            args.push(title);
        }
        if let Some(ref description) = spec.description {
            args.push("--description");
            args.push(description);
        }
        if let Some(ref status) = spec.status {
            args.push("--status");
            args.push(status);
        }
        if args.len() == 2 {
            return Ok(()); // nothing to change
        }
        self.run(&args).await?;
        Ok(())
    }

    pub async fn close(&self, id: &str) -> Result<(), BeadsError> {
        self.run(&["close", id]).await?;
        Ok(())
    }

    pub async fn reopen(&self, id: &str) -> Result<(), BeadsError> {
        self.run(&["reopen", id]).await?;
        Ok(())
    }

    pub async fn add_label(&self, id: &str, label: &str) -> Result<(), BeadsError> {
        self.run(&["label", "add", id, label]).await?;
        Ok(())
    }

    pub async fn remove_label(&self, id: &str, label: &str) -> Result<(), BeadsError> {
        self.run(&["label", "remove", id, label]).await?;
        Ok(())
    }

    pub async fn set_slot(&self, id: &str, slot: &str, value: &str) -> Result<(), BeadsError> {
        self.run(&["slot", "set", id, slot, value]).await?;
        Ok(())
    }

    pub async fn clear_slot(&self, id: &str, slot: &str) -> Result<(), BeadsError> {
        self.run(&["slot", "clear", id, slot]).await?;
        Ok(())
    }

    /// Add a dependency edge `child → parent` of the given kind
    /// (`hard`, `tracks`).
    pub async fn dep_add(&self, child: &str, parent: &str, kind: &str) -> Result<(), BeadsError> {
        self.run(&["dep", "add", child, parent, "--type", kind]).await?;
        Ok(())
    }

    pub async fn dep_remove(&self, child: &str, parent: &str) -> Result<(), BeadsError> {
        self.run(&["dep", "remove", child, parent]).await?;
        Ok(())
    }

    /// Ensure the custom type registration has been installed on a target
    /// store. Two-level cache: per-process set, then the on-disk sentinel.
    async fn ensure_types(&self, target: &Path) -> Result<(), BeadsError> {
        if self.types_ready.lock().contains(target) {
            return Ok(());
        }
        let sentinel = target.join(TYPES_SENTINEL);
        if !sentinel.exists() {
            self.run_in(
                target,
                &["config", "set", "types.custom", "agent,message,molecule,slot"],
            )
            .await?;
            if let Some(parent) = sentinel.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = std::fs::write(&sentinel, b"ok\n") {
                tracing::warn!(path = %sentinel.display(), error = %e, "failed to write types sentinel");
            }
        }
        self.types_ready.lock().insert(target.to_path_buf());
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Gateway<FakeRunner> {
    pub fn runner(&self) -> &FakeRunner {
        &self.runner
    }

    pub fn runner_calls(&self) -> Vec<(Vec<String>, PathBuf)> {
        self.runner.calls()
    }
}

/// Follow `.beads/redirect` files, bounded so a cycle cannot wedge us.
pub fn follow_redirect(mut target: PathBuf) -> PathBuf {
    for _ in 0..4 {
        let redirect = target.join(".beads/redirect");
        let Ok(text) = std::fs::read_to_string(&redirect) else {
            return target;
        };
        let dest = text.trim();
        if dest.is_empty() {
            return target;
        }
        let dest_path = Path::new(dest);
        target = if dest_path.is_absolute() {
            dest_path.to_path_buf()
        } else {
            target.join(dest_path)
        };
    }
    target
}

fn map_failure(op: &str, output: &RunOutput) -> BeadsError {
    let combined = output.combined();
    let lower = combined.to_ascii_lowercase();
    if lower.contains("not found") || lower.contains("no such issue") {
        return BeadsError::NotFound(combined);
    }
    if lower.contains("unique constraint") || lower.contains("already exists") {
        return BeadsError::Duplicate(combined);
    }
    BeadsError::Store { op: op.to_string(), output: combined }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
