//! Watch command handler
//!
//! Polls a job's status endpoint until the completion marker appears,
//! streaming intermediate response bodies to the terminal as they arrive.

use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use jobwatch_client::{
    JobPoller, ProgressSink, REGISTRATION_RETRY_DELAY, StatusClient, register_session,
};
use jobwatch_core::{JobKind, SessionId};
use serde::Serialize;
use tracing::warn;

use crate::commands::session::resolve_session;
use crate::config::Config;

/// Job flow selector for the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Regular analysis submission
    Task,
    /// Reload previously saved results
    Saved,
}

impl std::fmt::Display for KindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KindArg::Task => f.write_str("task"),
            KindArg::Saved => f.write_str("saved"),
        }
    }
}

impl From<KindArg> for JobKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Task => JobKind::Task,
            KindArg::Saved => JobKind::SavedResults,
        }
    }
}

/// Summary of a completed watch, for `--json` output
#[derive(Serialize)]
struct WatchReport {
    session: String,
    kind: String,
    attempts: u64,
    transport_failures: u32,
    server_faults: u32,
    body: String,
}

/// Sink that prints each body as it arrives
struct TerminalSink {
    quiet: bool,
}

impl ProgressSink for TerminalSink {
    fn update(&self, body: &str) {
        if !self.quiet {
            println!("{}", body.dimmed());
        }
    }
}

/// Watch a job until completion or fatal failure
pub async fn handle_watch(
    config: &Config,
    session: Option<String>,
    kind: KindArg,
    json: bool,
) -> Result<()> {
    let generated = session.is_none();
    let session = resolve_session(session);
    let kind = JobKind::from(kind);
    let client = Arc::new(StatusClient::new(&config.server_url));

    // A freshly generated session is unknown to the server; register it
    // first. Registration is best-effort, so a refusal only warns.
    if generated {
        match register_session(client.as_ref(), &session, REGISTRATION_RETRY_DELAY).await {
            Ok(true) => {}
            Ok(false) => warn!("session {session} unconfirmed, watching anyway"),
            Err(e) => warn!("session {session} registration failed: {e}"),
        }
    }

    if !json {
        println!(
            "{} {} job for session {}",
            "watching".bold(),
            kind,
            session.to_string().cyan()
        );
    }

    let mut poller = JobPoller::new(client, kind, session.clone());
    let sink = TerminalSink { quiet: json };

    match poller.run(&sink).await {
        Ok(body) => {
            if json {
                let report = WatchReport {
                    session: session.to_string(),
                    kind: kind.to_string(),
                    attempts: poller.attempts(),
                    transport_failures: poller.state().transport_failures(),
                    server_faults: poller.state().server_faults(),
                    body,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} after {} attempt(s)",
                    "✓ job finished".green(),
                    poller.attempts()
                );
            }
            Ok(())
        }
        Err(failure) => {
            // The user-facing notice names the status code and text.
            eprintln!("{} {}", "✗ polling failed:".red().bold(), failure);
            Err(failure.into())
        }
    }
}
