// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gt mail send|inbox`

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use gt_beads::{ExecRunner, Gateway};
use gt_core::SystemClock;
use gt_mail::{Mailroom, MessageDraft};

#[derive(Subcommand)]
pub enum MailCommand {
    /// Send a message (or post to a channel with --channel)
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        channel: Option<String>,
    },
    /// List open mail for an address
    Inbox { address: String },
}

fn mailroom(town: &Path) -> Mailroom<ExecRunner, SystemClock> {
    Mailroom::new(Arc::new(Gateway::new(ExecRunner::new(), town)), SystemClock)
}

fn sender_from_env() -> String {
    std::env::var("BD_ACTOR").unwrap_or_else(|_| "mayor".to_string())
}

pub async fn run(town: &Path, command: &MailCommand) -> Result<()> {
    let mailroom = mailroom(town);
    match command {
        MailCommand::Send { to, subject, body, from, channel } => {
            let draft = MessageDraft {
                from: from.clone().unwrap_or_else(sender_from_env),
                to: to.clone(),
                subject: subject.clone(),
                body: body.clone(),
            };
            let id = match channel {
                Some(channel) => mailroom.post(channel, &draft).await?,
                None => mailroom.send(&draft).await?,
            };
            println!("{id}");
        }
        MailCommand::Inbox { address } => {
            for message in mailroom.inbox(address).await? {
                println!("{}\t{}\t{}", message.id, message.from, message.subject);
            }
        }
    }
    Ok(())
}
