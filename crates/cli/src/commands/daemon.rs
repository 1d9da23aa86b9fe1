// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt daemon start|stop|status|log`

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use gt_daemon::detach::detach;
use gt_daemon::lifecycle::write_request;
use gt_daemon::paths;
use gt_daemon::state::{DaemonState, PidFile};
use gt_mail::LifecycleAction;

const STOP_WAIT: Duration = Duration::from_secs(10);

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Launch the daemon detached
    Start,
    /// Ask the running daemon to stop, then wait for it
    Stop,
    /// Print the daemon state file
    Status,
    /// Print the daemon log path
    Log,
}

pub async fn run(town: &Path, command: &DaemonCommand) -> Result<()> {
    match command {
        DaemonCommand::Start => start(town),
        DaemonCommand::Stop => stop(town).await,
        DaemonCommand::Status => status(town),
        DaemonCommand::Log => {
            println!("{}", paths::daemon_log(town).display());
            Ok(())
        }
    }
}

fn start(town: &Path) -> Result<()> {
    if let Some(state) = DaemonState::load(town)? {
        if state.running && PidFile::read(town).is_some() {
            bail!("daemon already running (pid {})", state.pid);
        }
    }

    let gtd = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("gtd")))
        .filter(|path| path.exists())
        .unwrap_or_else(|| "gtd".into());

    let mut cmd = std::process::Command::new(gtd);
    cmd.arg(town)
        .env("GT_TOWN_ROOT", town)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    detach(&mut cmd);
    let child = cmd.spawn().context("failed to launch gtd")?;
    println!("daemon starting (pid {})", child.id());
    Ok(())
}

async fn stop(town: &Path) -> Result<()> {
    let Some(pid) = PidFile::read(town) else {
        println!("daemon not running");
        return Ok(());
    };

    write_request(town, "", LifecycleAction::Shutdown).context("failed to write stop request")?;

    let deadline = Instant::now() + STOP_WAIT;
    while Instant::now() < deadline {
        if PidFile::read(town).is_none() {
            println!("daemon stopped");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    // The request file went unread; fall back to a signal
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        tracing_note(pid);
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        tokio::time::sleep(Duration::from_secs(1)).await;
        if PidFile::read(town).is_none() {
            println!("daemon stopped");
            return Ok(());
        }
    }
    bail!("daemon (pid {pid}) did not stop within {STOP_WAIT:?}");
}

#[cfg(unix)]
fn tracing_note(pid: u32) {
    eprintln!("gt: stop request unanswered; sending SIGTERM to {pid}");
}

fn status(town: &Path) -> Result<()> {
    match DaemonState::load(town)? {
        Some(state) => {
            let live = PidFile::read(town).is_some();
            println!(
                "running: {}\npid: {}\nstarted_at: {}\nlast_heartbeat: {}\nheartbeat_count: {}",
                state.running && live,
                state.pid,
                state.started_at.unwrap_or_default(),
                state.last_heartbeat,
                state.heartbeat_count,
            );
        }
        None => println!("daemon has never run in this town"),
    }
    Ok(())
}
