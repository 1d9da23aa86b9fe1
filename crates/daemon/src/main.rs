// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gtd: the Gas Town supervisor daemon.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use gt_beads::{ExecRunner, Gateway};
use gt_core::config::{enabled_from_env, DaemonConfig, RigsConfig};
use gt_core::roledef::RoleTable;
use gt_core::SystemClock;
use gt_daemon::daemon::{Daemon, DaemonDeps};
use gt_daemon::{convoy, lifecycle, paths, TownLog};
use gt_mail::LifecycleAction;
use gt_session::TmuxBackend;

fn town_root() -> PathBuf {
    std::env::var_os("GT_TOWN_ROOT")
        .map(PathBuf::from)
        .or_else(|| std::env::args_os().nth(1).map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn init_tracing(town: &std::path::Path) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = paths::daemon_log(town);
    let dir = log_path.parent()?;
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, "daemon.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn load_role_table(town: &std::path::Path, rigs: &RigsConfig) -> RoleTable {
    let mut roles = RoleTable::embedded();
    let mut overlay_paths = vec![town.join("mayor/roles.toml")];
    for rig in rigs.rig_names() {
        overlay_paths.push(town.join(rig).join(".runtime/roles.toml"));
    }
    for path in overlay_paths {
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        match RoleTable::parse_overlay(&text) {
            Ok(overlay) => roles.apply(overlay),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "bad role overlay"),
        }
    }
    roles
}

#[tokio::main]
async fn main() {
    let town = town_root();
    let _guard = init_tracing(&town);

    if !enabled_from_env(
        std::env::var("GASTOWN_DISABLED").ok().as_deref(),
        std::env::var("GASTOWN_ENABLED").ok().as_deref(),
    ) {
        tracing::info!("gastown disabled via environment; exiting");
        return;
    }

    let rigs = match RigsConfig::load(&town) {
        Ok(rigs) => rigs,
        Err(e) => {
            eprintln!("gtd: cannot load rig catalog: {e}");
            std::process::exit(1);
        }
    };
    let config = match DaemonConfig::load(&town) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gtd: invalid daemon config: {e}");
            std::process::exit(1);
        }
    };
    let roles = load_role_table(&town, &rigs);

    let gw = Arc::new(Gateway::new(ExecRunner::new(), &town));
    let daemon = Daemon::new(
        DaemonDeps {
            gw: gw.clone(),
            sessions: TmuxBackend::new(),
            clock: SystemClock,
            town_root: town.clone(),
        },
        config,
        rigs,
        roles,
    );
    let cancel = daemon.cancel_token();

    spawn_signal_handlers(&town, cancel.clone());
    spawn_activity_tail(gw, &town, cancel.clone());

    if let Err(e) = daemon.run().await {
        tracing::error!(error = %e, "daemon failed");
        eprintln!("gtd: {e}");
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn spawn_signal_handlers(town: &std::path::Path, cancel: tokio_util::sync::CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let request_town = town.to_path_buf();
    tokio::spawn(async move {
        let mut interrupt = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "cannot install SIGINT handler");
                return;
            }
        };
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "cannot install SIGTERM handler");
                return;
            }
        };
        let mut user1 = match signal(SignalKind::user_defined1()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "cannot install SIGUSR1 handler");
                return;
            }
        };
        loop {
            tokio::select! {
                _ = interrupt.recv() => {
                    tracing::info!("SIGINT; shutting down");
                    cancel.cancel();
                }
                _ = terminate.recv() => {
                    tracing::info!("SIGTERM; shutting down");
                    cancel.cancel();
                }
                _ = user1.recv() => {
                    // Same path as the file-based request, for portability
                    tracing::info!("SIGUSR1; queueing lifecycle request");
                    if let Err(e) =
                        lifecycle::write_request(&request_town, "", LifecycleAction::Cycle)
                    {
                        tracing::warn!(error = %e, "failed to queue lifecycle request");
                    }
                }
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_signal_handlers(_town: &std::path::Path, cancel: tokio_util::sync::CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}

/// Follow the store's activity stream and drive convoy completion.
fn spawn_activity_tail(
    gw: Arc<Gateway<ExecRunner>>,
    town: &std::path::Path,
    cancel: tokio_util::sync::CancellationToken,
) {
    let town = town.to_path_buf();
    tokio::spawn(async move {
        let townlog = TownLog::new(&town);
        loop {
            if cancel.is_cancelled() {
                break;
            }
            let child = tokio::process::Command::new("bd")
                .args(["activity", "--follow", "--json"])
                .current_dir(&town)
                .stdout(std::process::Stdio::piped())
                .stdin(std::process::Stdio::null())
                .kill_on_drop(true)
                .spawn();
            let mut child = match child {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(error = %e, "cannot start activity follower; retrying");
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                    continue;
                }
            };

            let (tx, rx) = tokio::sync::mpsc::channel(100);
            let reader_cancel = cancel.clone();
            let stdout = child.stdout.take();
            let reader = tokio::spawn(async move {
                let Some(stdout) = stdout else { return };
                let mut lines = tokio::io::BufReader::new(stdout).lines();
                loop {
                    tokio::select! {
                        _ = reader_cancel.cancelled() => break,
                        line = lines.next_line() => match line {
                            Ok(Some(line)) => {
                                if tx.send(line).await.is_err() {
                                    break;
                                }
                            }
                            _ => break,
                        },
                    }
                }
            });

            convoy::run_activity_tail(&gw, &town, &townlog, cancel.clone(), rx).await;
            let _ = reader.await;
            drop(child);

            if !cancel.is_cancelled() {
                // Follower died underneath us; back off and reconnect
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    });
}
