// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg(unix)]

use super::*;
use std::os::unix::fs::PermissionsExt;

fn write_hook(dir: &Path, name: &str, body: &str, mode: u32) {
    let hooks = dir.join(".runtime/setup-hooks");
    std::fs::create_dir_all(&hooks).unwrap();
    let path = hooks.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
}

#[tokio::test]
async fn hooks_run_sorted_in_the_worktree() {
    let rig = tempfile::tempdir().unwrap();
    let worktree = tempfile::tempdir().unwrap();
    write_hook(rig.path(), "20-second.sh", "#!/bin/sh\necho two >> order.txt\n", 0o755);
    write_hook(rig.path(), "10-first.sh", "#!/bin/sh\necho one >> order.txt\n", 0o755);

    let ran = run_setup_hooks(rig.path(), worktree.path()).await;
    assert_eq!(ran, 2);

    let order = std::fs::read_to_string(worktree.path().join("order.txt")).unwrap();
    assert_eq!(order, "one\ntwo\n");
}

#[tokio::test]
async fn non_executable_hooks_are_skipped() {
    let rig = tempfile::tempdir().unwrap();
    let worktree = tempfile::tempdir().unwrap();
    write_hook(rig.path(), "10-noexec.sh", "#!/bin/sh\ntouch ran.txt\n", 0o644);

    let ran = run_setup_hooks(rig.path(), worktree.path()).await;
    assert_eq!(ran, 0);
    assert!(!worktree.path().join("ran.txt").exists());
}

#[tokio::test]
async fn failing_hook_does_not_stop_the_rest() {
    let rig = tempfile::tempdir().unwrap();
    let worktree = tempfile::tempdir().unwrap();
    write_hook(rig.path(), "10-fail.sh", "#!/bin/sh\nexit 1\n", 0o755);
    write_hook(rig.path(), "20-ok.sh", "#!/bin/sh\ntouch ok.txt\n", 0o755);

    let ran = run_setup_hooks(rig.path(), worktree.path()).await;
    assert_eq!(ran, 1);
    assert!(worktree.path().join("ok.txt").exists());
}

#[tokio::test]
async fn missing_hooks_dir_is_fine() {
    let rig = tempfile::tempdir().unwrap();
    let worktree = tempfile::tempdir().unwrap();
    assert_eq!(run_setup_hooks(rig.path(), worktree.path()).await, 0);
}
