// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn town_with(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("mayor")).unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[test]
fn loads_town_and_rigs() {
    let town = town_with(&[
        ("mayor/town.json", r#"{"name": "citadel"}"#),
        (
            "mayor/rigs.json",
            r#"{"rigs": {"gastown": {"git_url": "https://example.com/g.git", "prefix": "gt"}}}"#,
        ),
    ]);

    let town_cfg = TownConfig::load(town.path()).unwrap();
    assert_eq!(town_cfg.name, "citadel");

    let rigs = RigsConfig::load(town.path()).unwrap();
    assert_eq!(rigs.prefix_for("gastown"), Some("gt"));
    assert_eq!(rigs.prefix_for("nexus"), None);
    assert_eq!(rigs.rig_names(), vec!["gastown".to_string()]);
}

#[test]
fn daemon_config_defaults_when_missing() {
    let town = town_with(&[]);
    let cfg = DaemonConfig::load(town.path()).unwrap();
    assert!(cfg.patrol_enabled("deacon"));
    assert!(cfg.patrol_enabled("retention"));
    assert_eq!(cfg.heartbeat_interval_secs, None);
}

#[test]
fn daemon_config_disables_named_patrols() {
    let town = town_with(&[(
        "mayor/daemon.json",
        r#"{"patrols": {"witness": false}, "heartbeat_interval_secs": 60}"#,
    )]);
    let cfg = DaemonConfig::load(town.path()).unwrap();
    assert!(!cfg.patrol_enabled("witness"));
    assert!(cfg.patrol_enabled("refinery"));
    assert_eq!(cfg.heartbeat_interval_secs, Some(60));
}

#[test]
fn parse_error_names_the_file() {
    let town = town_with(&[("mayor/town.json", "not json")]);
    let err = TownConfig::load(town.path()).unwrap_err();
    assert!(err.to_string().contains("town.json"));
}

#[yare::parameterized(
    neither        = { None, None, true },
    disabled       = { Some("1"), None, false },
    disabled_wins  = { Some("1"), Some("1"), false },
    enabled_only   = { None, Some("1"), true },
    enabled_zero   = { None, Some("0"), false },
    disabled_zero  = { Some("0"), None, true },
)]
fn env_gate(disabled: Option<&str>, enabled: Option<&str>, expected: bool) {
    assert_eq!(enabled_from_env(disabled, enabled), expected);
}
