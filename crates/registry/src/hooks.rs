// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rig setup hooks.
//!
//! `<rig>/.runtime/setup-hooks/*` run once per fresh worktree, sorted by
//! filename, executable files only. A broken hook warns and is skipped:
//! hooks prepare a workspace, they do not gate a spawn.

use std::path::Path;

/// Run the rig's setup hooks against a fresh worktree.
///
/// Returns the number of hooks that ran successfully.
pub async fn run_setup_hooks(rig_dir: &Path, worktree: &Path) -> usize {
    let hooks_dir = rig_dir.join(".runtime/setup-hooks");
    let Ok(entries) = std::fs::read_dir(&hooks_dir) else {
        return 0;
    };

    let mut hooks: Vec<_> = entries.flatten().map(|e| e.path()).filter(|p| p.is_file()).collect();
    hooks.sort();

    let mut ran = 0;
    for hook in hooks {
        if !is_executable(&hook) {
            tracing::warn!(hook = %hook.display(), "setup hook is not executable; skipping");
            continue;
        }
        let result = tokio::process::Command::new(&hook)
            .current_dir(worktree)
            .env("GT_WORKTREE", worktree)
            .output()
            .await;
        match result {
            Ok(output) if output.status.success() => ran += 1,
            Ok(output) => {
                tracing::warn!(
                    hook = %hook.display(),
                    code = output.status.code().unwrap_or(-1),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "setup hook failed; skipping"
                );
            }
            Err(e) => {
                tracing::warn!(hook = %hook.display(), error = %e, "setup hook failed to run; skipping");
            }
        }
    }
    ran
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
