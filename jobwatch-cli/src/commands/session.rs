//! Session command handlers
//!
//! Generating session identifiers and registering them with the job
//! service.

use anyhow::{Context, Result};
use colored::*;
use jobwatch_client::{REGISTRATION_RETRY_DELAY, StatusClient, register_session};
use jobwatch_core::SessionId;

use crate::config::Config;

/// Generate and print a fresh session identifier
pub fn print_session() -> Result<()> {
    println!("{}", SessionId::generate().to_string().cyan());
    Ok(())
}

/// Register a session, generating one first if none was given
pub async fn handle_register(config: &Config, session: Option<String>) -> Result<()> {
    let session = resolve_session(session);
    let client = StatusClient::new(&config.server_url);

    let confirmed = register_session(&client, &session, REGISTRATION_RETRY_DELAY)
        .await
        .context("Failed to register session")?;

    if confirmed {
        println!("{} session {}", "✓ registered".green(), session.to_string().cyan());
    } else {
        // Best effort: the server never echoed a confirmation, but jobs
        // submitted under this session may still be accepted.
        println!(
            "{} session {} (no confirmation from server)",
            "⚠ unconfirmed".yellow(),
            session.to_string().cyan()
        );
    }

    Ok(())
}

/// Wrap a user-supplied identifier, or generate a new one
pub fn resolve_session(session: Option<String>) -> SessionId {
    match session {
        Some(id) => SessionId::new(id),
        None => SessionId::generate(),
    }
}
