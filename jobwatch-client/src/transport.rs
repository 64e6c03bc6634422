//! Status transport
//!
//! Seam between the poll driver and the wire. The trait exists so the
//! driver and the registration loop can be exercised against a scripted
//! in-memory transport in tests; [`StatusClient`] is the HTTP
//! implementation.

use async_trait::async_trait;
use jobwatch_core::{JobKind, ProbeOutcome, SessionId};
use tracing::debug;

use crate::StatusClient;
use crate::error::{ClientError, Result};

/// Transport for status probes and session registration.
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Issues one status probe for the given session and job kind.
    ///
    /// Never fails: a request that cannot complete is reported as
    /// [`ProbeOutcome::TransportUnavailable`] so the poller can budget it.
    async fn probe(&self, kind: JobKind, session: &SessionId) -> ProbeOutcome;

    /// Sends one registration request for the session.
    ///
    /// Returns the response body on a success status; any non-success
    /// status or transport failure is an error.
    async fn register(&self, session: &SessionId) -> Result<String>;
}

#[async_trait]
impl StatusTransport for StatusClient {
    async fn probe(&self, kind: JobKind, session: &SessionId) -> ProbeOutcome {
        let url = format!("{}{}", self.base_url(), kind.status_path());
        // Cache-busting timestamp, same shape the server already expects.
        let stamp = chrono::Utc::now().timestamp_millis().to_string();

        let response = match self
            .client
            .get(&url)
            .query(&[("sessionID", session.as_str()), ("timestamp", stamp.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("status probe did not complete: {e}");
                return ProbeOutcome::TransportUnavailable;
            }
        };

        let status = response.status();
        let text = status.canonical_reason().unwrap_or_default().to_string();
        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("failed to read status body: {e}");
                None
            }
        };

        ProbeOutcome::Status {
            code: status.as_u16(),
            text,
            body,
        }
    }

    async fn register(&self, session: &SessionId) -> Result<String> {
        let url = format!("{}{}", self.base_url(), self.register_path);

        let response = self
            .client
            .post(&url)
            .form(&[("register", "on"), ("sessionID", session.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        Ok(response.text().await.unwrap_or_default())
    }
}
