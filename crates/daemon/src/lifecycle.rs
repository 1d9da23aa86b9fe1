// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle requests.
//!
//! Two doors into the same handler: request files under
//! `daemon/requests/` (written by the CLI, and by SIGUSR1 on Unix), and
//! the deacon's mail inbox. A request with an empty `from` targets the
//! daemon itself; otherwise the sender's own session is cycled,
//! restarted, or shut down.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gt_beads::gateway::BeadsRunner;
use gt_core::address::Address;
use gt_core::config::RigsConfig;
use gt_core::roledef::RoleTable;
use gt_core::session_name::session_name;
use gt_core::Clock;
use gt_mail::{classify, parse_lifecycle_request, LifecycleAction, LifecycleRequest, Mailroom, ProtocolKind};
use gt_session::backend::{SessionBackend, SessionSpec};
use gt_session::beacon::{startup_prompt, Topic};

use crate::error::DaemonError;
use crate::paths;

/// On-disk shape of one request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RequestFile {
    #[serde(default)]
    from: String,
    action: String,
}

/// Drop a request file for the daemon to pick up. An empty `from`
/// addresses the daemon itself.
pub fn write_request(town: &Path, from: &str, action: LifecycleAction) -> std::io::Result<PathBuf> {
    let dir = paths::request_dir(town);
    std::fs::create_dir_all(&dir)?;
    let file = RequestFile { from: from.to_string(), action: action.as_str().to_string() };
    let name = format!(
        "{}-{}.json",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
        std::process::id(),
    );
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&file).unwrap_or_default())?;
    Ok(path)
}

/// Read and remove pending request files, oldest first.
pub fn take_requests(town: &Path) -> Vec<LifecycleRequest> {
    let dir = paths::request_dir(town);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return vec![];
    };
    let mut files: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    files.sort();

    let mut requests = Vec::new();
    for path in files {
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        if let Ok(file) = serde_json::from_str::<RequestFile>(&text) {
            if let Some(req) = parse_lifecycle_request(&file.from, "", &file.action, None) {
                requests.push(req);
            } else {
                tracing::warn!(path = %path.display(), action = %file.action, "unknown lifecycle action");
            }
        }
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove request file");
        }
    }
    requests
}

/// Poll the lifecycle inbox: protocol-classified shutdown subjects and
/// parseable lifecycle bodies become requests; processed messages are
/// archived so the tail never re-reads them.
pub async fn poll_inbox<R: BeadsRunner, C: Clock>(
    mailroom: &Mailroom<R, C>,
    inbox: &str,
) -> Result<Vec<LifecycleRequest>, DaemonError> {
    let mut requests = Vec::new();
    for message in mailroom.inbox(inbox).await? {
        let classified = classify(&message.subject);
        let parsed = parse_lifecycle_request(
            &message.from,
            &message.subject,
            &message.body,
            message.sent_at.map(|t| t.timestamp_millis() as u64),
        );
        let request = match (classified, parsed) {
            (_, Some(req)) => req,
            (ProtocolKind::LifecycleShutdown, None) => LifecycleRequest {
                from: message.from.clone(),
                action: LifecycleAction::Shutdown,
                timestamp: None,
            },
            _ => continue,
        };
        mailroom.archive(&message.id).await?;
        requests.push(request);
    }
    Ok(requests)
}

/// What applying a request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The daemon itself must stop.
    DaemonShutdown,
    SessionKilled(String),
    SessionRestarted(String),
    /// Unresolvable sender; nothing done.
    Skipped(String),
}

/// Apply one request against the session fabric.
pub async fn apply<B: SessionBackend>(
    sessions: &B,
    roles: &RoleTable,
    rigs: &RigsConfig,
    town_root: &Path,
    req: &LifecycleRequest,
) -> Result<Applied, DaemonError> {
    if req.from.is_empty() {
        return Ok(Applied::DaemonShutdown);
    }

    let Ok(address) = Address::parse(&req.from) else {
        tracing::warn!(from = %req.from, "lifecycle request from unparseable address");
        return Ok(Applied::Skipped(req.from.clone()));
    };
    let identity = address.identity().clone();
    let prefix = rigs.prefix_for(&identity.rig).unwrap_or("gt");
    let session = session_name(&identity, prefix);

    sessions.kill(&session).await?;
    if req.action == LifecycleAction::Shutdown {
        return Ok(Applied::SessionKilled(session));
    }

    // Cycle gets a fresh conversation; restart keeps its topic honest
    let topic = match req.action {
        LifecycleAction::Cycle => Topic::Start,
        _ => Topic::Restart,
    };
    let def = roles.get(identity.role);
    let workdir = if identity.rig.is_empty() {
        town_root.to_path_buf()
    } else {
        town_root.join(&identity.rig)
    };
    sessions
        .create(&SessionSpec {
            name: session.clone(),
            command: def.start_command.clone().unwrap_or_default(),
            workdir,
            env: def.env.clone(),
        })
        .await?;
    let prompt = startup_prompt(topic, &req.from, "daemon", None, def.startup_instructions.as_deref());
    sessions.send_input(&session, prompt.trim_end()).await?;
    Ok(Applied::SessionRestarted(session))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
