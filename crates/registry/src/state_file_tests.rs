// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rex/.dog.json");

    let state = WorkerState {
        name: "rex".to_string(),
        role: "dog".to_string(),
        status: WorkerStatus::Working,
        work: Some("gt-work-1".to_string()),
        worktrees: [("gastown".to_string(), PathBuf::from("/t/deacon/dogs/rex/gastown"))].into(),
        branches: [("gastown".to_string(), "dog/rex-gastown-1700".to_string())].into(),
        created_at: 1_000,
        last_active: 2_000,
        ..Default::default()
    };
    state.save(&path).unwrap();

    assert_eq!(WorkerState::load(&path).unwrap(), state);
}

#[test]
fn load_if_exists_tolerates_missing() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = WorkerState::load_if_exists(&dir.path().join(".dog.json")).unwrap();
    assert_eq!(loaded, None);
}

#[test]
fn corrupt_state_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".dog.json");
    std::fs::write(&path, "not json").unwrap();
    let err = WorkerState::load(&path).unwrap_err();
    assert!(matches!(err, RegistryError::StateJson { .. }));
}

#[test]
fn old_state_files_without_new_fields_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".dog.json");
    std::fs::write(
        &path,
        r#"{"name": "rex", "role": "dog", "created_at": 1, "last_active": 1}"#,
    )
    .unwrap();
    let state = WorkerState::load(&path).unwrap();
    assert_eq!(state.status, WorkerStatus::Idle);
    assert_eq!(state.work, None);
    assert!(state.worktrees.is_empty());
}
