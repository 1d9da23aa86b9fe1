// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt: operator CLI for the Gas Town supervisor.

mod commands;
mod embedded;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gt", about = "Gas Town workstation supervisor", version)]
struct Cli {
    /// Town root (defaults to $GT_TOWN_ROOT, then the current directory)
    #[arg(long, global = true)]
    town: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Supervisor daemon control
    Daemon {
        #[command(subcommand)]
        command: commands::daemon::DaemonCommand,
    },
    /// Formula catalog maintenance
    Formula {
        #[command(subcommand)]
        command: commands::formula::FormulaCommand,
    },
    /// Mail operations
    Mail {
        #[command(subcommand)]
        command: commands::mail::MailCommand,
    },
    /// Show the calling agent's hooked work
    Hook,
    /// Stream the live town event feed
    Feed,
}

fn town_root(cli: &Cli) -> PathBuf {
    cli.town
        .clone()
        .or_else(|| std::env::var_os("GT_TOWN_ROOT").map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let town = town_root(&cli);

    let result: Result<()> = match cli.command {
        Command::Daemon { ref command } => commands::daemon::run(&town, command).await,
        Command::Formula { ref command } => commands::formula::run(&town, command),
        Command::Mail { ref command } => commands::mail::run(&town, command).await,
        Command::Hook => commands::hook::run(&town).await,
        Command::Feed => commands::feed::run(&town).await,
    };

    if let Err(e) = result {
        eprintln!("gt: {e:#}");
        std::process::exit(1);
    }
}
