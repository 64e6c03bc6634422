//! Jobwatch HTTP Client
//!
//! Client-side plumbing for a job service that reports completion by
//! embedding a marker substring in a status response body.
//!
//! The crate covers three concerns:
//! - [`StatusClient`]: the HTTP transport for status probes and session
//!   registration
//! - [`JobPoller`]: the fixed-interval poll driver built on the decision
//!   machine from `jobwatch-core`
//! - [`register_session`]: best-effort session registration with bounded
//!   retries
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jobwatch_client::{JobPoller, StatusClient, sink::DiscardSink};
//! use jobwatch_core::{JobKind, SessionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(StatusClient::new("http://localhost:8080"));
//!     let session = SessionId::generate();
//!
//!     let mut poller = JobPoller::new(client, JobKind::Task, session);
//!     let body = poller.run(&DiscardSink).await?;
//!
//!     println!("{body}");
//!     Ok(())
//! }
//! ```

pub mod error;
mod poller;
mod register;
pub mod sink;
mod transport;

pub use error::{ClientError, Result};
pub use poller::JobPoller;
pub use register::{
    MAX_REGISTRATION_RETRIES, REGISTRATION_CONFIRMATION, REGISTRATION_RETRY_DELAY,
    register_session,
};
pub use sink::ProgressSink;
pub use transport::StatusTransport;

use reqwest::Client;

/// HTTP client for the job service endpoints.
///
/// Status probes are `GET <base>/<kind path>?sessionID=..&timestamp=..`;
/// registration is a form-encoded `POST` to the session endpoint. All
/// polling policy lives in [`JobPoller`]; this type only moves bytes.
#[derive(Debug, Clone)]
pub struct StatusClient {
    /// Base URL of the job service (e.g., "http://localhost:8080")
    base_url: String,
    /// Registration endpoint path
    pub(crate) register_path: String,
    /// HTTP client instance
    pub(crate) client: Client,
}

impl StatusClient {
    /// Creates a new status client.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the job service (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a new status client with a custom HTTP client.
    ///
    /// This allows configuring timeouts, proxies, TLS settings, etc.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the job service
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            register_path: "/session".to_string(),
            client,
        }
    }

    /// Overrides the registration endpoint path (default `/session`).
    pub fn with_register_path(mut self, path: impl Into<String>) -> Self {
        self.register_path = path.into();
        self
    }

    /// The base URL of the job service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
