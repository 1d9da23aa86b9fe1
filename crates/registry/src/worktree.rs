// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git worktree shelling.
//!
//! Worktrees come off the rig's bare repo (`<rig>/.repo.git`) when one
//! exists, else off the mayor's checkout (`<rig>/mayor/rig`). Each worker
//! branch is `<role>/<name>-<rig>-<millis>` from `origin/<default-branch>`.

use std::path::{Path, PathBuf};

use crate::error::RegistryError;

/// Where worktrees for a rig come from.
pub fn repo_source(town_root: &Path, rig: &str) -> PathBuf {
    let bare = town_root.join(rig).join(".repo.git");
    if bare.exists() {
        bare
    } else {
        town_root.join(rig).join("mayor/rig")
    }
}

/// Worker branch name, unique per (worker, rig, instant).
pub fn branch_name(role: &str, name: &str, rig: &str, millis: u64) -> String {
    format!("{role}/{name}-{rig}-{millis}")
}

async fn git(repo: &Path, args: &[&str], op: &'static str) -> Result<String, RegistryError> {
    let output = tokio::process::Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .await
        .map_err(|e| RegistryError::Worktree {
            op,
            path: repo.display().to_string(),
            detail: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(RegistryError::Worktree {
            op,
            path: repo.display().to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// `git worktree add -b <branch> <path> <start_point>`
pub async fn add(
    repo: &Path,
    path: &Path,
    branch: &str,
    start_point: &str,
) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RegistryError::Worktree {
            op: "add",
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
    }
    let path_str = path.display().to_string();
    git(repo, &["worktree", "add", "-b", branch, &path_str, start_point], "add").await?;
    Ok(())
}

/// `git worktree remove --force` plus a directory sweep for remnants.
/// Best-effort by design: a half-removed worktree must not wedge a kill.
pub async fn remove(repo: &Path, path: &Path) {
    let path_str = path.display().to_string();
    if let Err(e) = git(repo, &["worktree", "remove", "--force", &path_str], "remove").await {
        tracing::warn!(path = %path.display(), error = %e, "worktree remove failed");
    }
    if path.exists() {
        if let Err(e) = std::fs::remove_dir_all(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove worktree dir");
        }
    }
}

/// `git worktree prune`: drop stale administrative entries.
pub async fn prune(repo: &Path) {
    if let Err(e) = git(repo, &["worktree", "prune"], "prune").await {
        tracing::warn!(repo = %repo.display(), error = %e, "worktree prune failed");
    }
}

/// Branches under `<role>/` in the repo.
pub async fn list_role_branches(repo: &Path, role: &str) -> Result<Vec<String>, RegistryError> {
    let pattern = format!("{role}/*");
    let stdout = git(
        repo,
        &["for-each-ref", "--format=%(refname:short)", &format!("refs/heads/{pattern}")],
        "list-branches",
    )
    .await?;
    Ok(stdout.lines().map(str::to_string).filter(|s| !s.is_empty()).collect())
}

/// `git branch -D`, used only on branches we created and orphaned.
pub async fn delete_branch(repo: &Path, branch: &str) -> Result<(), RegistryError> {
    git(repo, &["branch", "-D", branch], "delete-branch").await?;
    Ok(())
}
