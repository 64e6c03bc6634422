//! Session identity
//!
//! A session correlates a client with job state held on the server. The
//! identifier is generated once when the client starts and is sent with
//! every request for the lifetime of that session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier.
///
/// Generated identifiers are timestamp-derived with a random suffix,
/// e.g. `20260823-1412-482917364`. The server treats them as opaque
/// strings; the timestamp prefix only exists so that operators can read
/// roughly when a session started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an existing identifier, e.g. one supplied on the command line.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier from the local clock and a random suffix.
    pub fn generate() -> Self {
        let now = chrono::Local::now();
        // Suffix range matches the server's expectation of a plain
        // sub-billion integer.
        let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
        Self(format!("{}-{}", now.format("%Y%m%d-%H%M"), suffix))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two job flows the server exposes.
///
/// Both kinds share identical polling semantics and differ only in the
/// endpoint they are polled on, so the poller is parameterized by kind
/// rather than duplicated per flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    /// A regular analysis submission.
    Task,
    /// Reloading previously saved results.
    SavedResults,
}

impl JobKind {
    /// The status endpoint path for this job kind.
    pub fn status_path(self) -> &'static str {
        match self {
            JobKind::Task => "/submit",
            JobKind::SavedResults => "/json-submit",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Task => f.write_str("task"),
            JobKind::SavedResults => f.write_str("saved-results"),
        }
    }
}
