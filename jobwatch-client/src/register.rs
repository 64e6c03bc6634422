//! Session registration
//!
//! Before a job is submitted the session identifier is registered with the
//! server so it can associate uploaded work with the session. Registration
//! is best-effort: the server confirms by echoing a body containing
//! [`REGISTRATION_CONFIRMATION`], and an unconfirmed registration is retried
//! a bounded number of times, then given up on silently. Jobs submitted
//! under an unconfirmed session may still work; the server decides.

use std::time::Duration;

use jobwatch_core::SessionId;
use tokio::time;
use tracing::{debug, warn};

use crate::error::Result;
use crate::transport::StatusTransport;

/// Substring the server echoes to confirm a registration.
pub const REGISTRATION_CONFIRMATION: &str = "response";

/// Retries attempted after the initial unconfirmed registration request.
pub const MAX_REGISTRATION_RETRIES: u32 = 10;

/// Pause between registration attempts.
pub const REGISTRATION_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Registers a session with the server.
///
/// Returns `Ok(true)` once the server confirms, or `Ok(false)` after the
/// retry budget is spent without confirmation (the silent give-up: no
/// error, callers may proceed). A non-success status or a transport
/// failure is an error and is not retried.
///
/// # Arguments
/// * `transport` - Transport used to send registration requests
/// * `session` - The session to register
/// * `retry_delay` - Pause between attempts, normally [`REGISTRATION_RETRY_DELAY`]
pub async fn register_session(
    transport: &dyn StatusTransport,
    session: &SessionId,
    retry_delay: Duration,
) -> Result<bool> {
    let mut retries = 0;

    loop {
        let body = transport.register(session).await?;

        if body.contains(REGISTRATION_CONFIRMATION) {
            debug!("session {session} registered");
            return Ok(true);
        }

        if retries >= MAX_REGISTRATION_RETRIES {
            warn!(
                "session {session} unconfirmed after {MAX_REGISTRATION_RETRIES} retries, giving up"
            );
            return Ok(false);
        }

        retries += 1;
        debug!("session {session} unconfirmed, retry {retries}/{MAX_REGISTRATION_RETRIES}");
        time::sleep(retry_delay).await;
    }
}
