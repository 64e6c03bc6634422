//! Poll decision state machine
//!
//! The server signals job completion by embedding a marker substring in an
//! otherwise free-form response body, so the client has to keep asking until
//! the marker shows up. This module holds the pure decision logic: given the
//! outcome of one status probe, decide whether to retry, stop with the final
//! body, or abort.
//!
//! Transient failures are budgeted: transport-level failures and server
//! faults (500) each get a bounded number of retries per session, while
//! in-progress bodies (200 without the marker) never consume budget and can
//! recur indefinitely. The counters are never reset or decremented; a session
//! that exhausts a budget is finished for good.

use std::time::Duration;

use thiserror::Error;

/// Marker substring whose presence in a response body signals completion.
pub const DEFAULT_COMPLETION_MARKER: &str = "Job Done";

/// How many consecutive transient failures of one class are tolerated.
pub const DEFAULT_RETRY_CEILING: u32 = 60;

/// Pause between attempts, measured from response receipt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Tuning knobs for one polling session.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Substring that marks a body as the final result.
    pub completion_marker: String,
    /// Maximum tolerated failures per transient-failure class.
    pub retry_ceiling: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            completion_marker: DEFAULT_COMPLETION_MARKER.to_string(),
            retry_ceiling: DEFAULT_RETRY_CEILING,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl PollPolicy {
    /// Overrides the completion marker.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.completion_marker = marker.into();
        self
    }

    /// Overrides the retry ceiling.
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.retry_ceiling = ceiling;
        self
    }

    /// Overrides the delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// What one status probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The request could not complete at all (connection refused, dropped,
    /// DNS failure). The transport never produced a status code.
    TransportUnavailable,
    /// The server answered with a status code.
    Status {
        /// HTTP status code.
        code: u16,
        /// Reason phrase for the status line, used in failure notices.
        text: String,
        /// Response body, or `None` when the body could not be read.
        body: Option<String>,
    },
}

impl ProbeOutcome {
    /// Convenience constructor for a status outcome.
    pub fn status(code: u16, text: impl Into<String>, body: Option<String>) -> Self {
        Self::Status {
            code,
            text: text.into(),
            body,
        }
    }
}

/// Decision for one observed probe outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Try again after the policy delay.
    Retry,
    /// The job finished; carries the final response body.
    Done(String),
    /// Polling is over for this session, unsuccessfully.
    Abort(PollFailure),
}

/// Terminal polling failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollFailure {
    /// Transport failures exhausted the retry budget.
    #[error("lost connection to the server after {0} failed attempts")]
    ConnectionLost(u32),
    /// Server faults (500) exhausted the retry budget.
    #[error("{status} : {text}")]
    ServerFault {
        /// HTTP status code.
        status: u16,
        /// Reason phrase.
        text: String,
    },
    /// Any other non-success status; fatal on first occurrence.
    #[error("{status} : {text}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Reason phrase.
        text: String,
    },
}

/// Per-session retry accounting.
///
/// One instance per polling session, so two concurrent sessions (say, a task
/// submission and a saved-results load) never share budget.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    transport_failures: u32,
    server_faults: u32,
}

impl PollState {
    /// Creates a fresh state with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport failures observed so far.
    pub fn transport_failures(&self) -> u32 {
        self.transport_failures
    }

    /// Server faults observed so far.
    pub fn server_faults(&self) -> u32 {
        self.server_faults
    }

    /// Applies the decision policy to one probe outcome.
    ///
    /// Counting rules:
    /// - transport failures and 500s each increment their own counter while
    ///   it is still below the ceiling; at the ceiling the next occurrence
    ///   aborts, so a ceiling of 60 tolerates exactly 60 failures
    /// - 200 responses never touch either counter, whether or not they carry
    ///   the marker and whether or not the body was readable
    /// - any other status aborts immediately
    pub fn observe(&mut self, policy: &PollPolicy, outcome: ProbeOutcome) -> PollStep {
        match outcome {
            ProbeOutcome::Status {
                code: 200, body, ..
            } => match body {
                Some(text) if text.contains(&policy.completion_marker) => PollStep::Done(text),
                // In-progress body, or a body we failed to read: both are
                // non-terminal and cost no budget.
                Some(_) | None => PollStep::Retry,
            },
            ProbeOutcome::TransportUnavailable => {
                if self.transport_failures < policy.retry_ceiling {
                    self.transport_failures += 1;
                    PollStep::Retry
                } else {
                    PollStep::Abort(PollFailure::ConnectionLost(policy.retry_ceiling))
                }
            }
            ProbeOutcome::Status {
                code: 500, text, ..
            } => {
                if self.server_faults < policy.retry_ceiling {
                    self.server_faults += 1;
                    PollStep::Retry
                } else {
                    PollStep::Abort(PollFailure::ServerFault { status: 500, text })
                }
            }
            ProbeOutcome::Status { code, text, .. } => {
                PollStep::Abort(PollFailure::Unexpected { status: code, text })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PollPolicy {
        PollPolicy::default()
    }

    fn ok_body(body: &str) -> ProbeOutcome {
        ProbeOutcome::status(200, "OK", Some(body.to_string()))
    }

    #[test]
    fn test_marker_body_terminates() {
        let mut state = PollState::new();
        let step = state.observe(&policy(), ok_body("<p>done. Job Done</p>"));
        assert_eq!(step, PollStep::Done("<p>done. Job Done</p>".to_string()));
    }

    #[test]
    fn test_in_progress_bodies_cost_no_budget() {
        let mut state = PollState::new();
        for _ in 0..10_000 {
            assert_eq!(state.observe(&policy(), ok_body("still working")), PollStep::Retry);
        }
        assert_eq!(state.transport_failures(), 0);
        assert_eq!(state.server_faults(), 0);
    }

    #[test]
    fn test_unreadable_body_is_transient() {
        let mut state = PollState::new();
        let step = state.observe(&policy(), ProbeOutcome::status(200, "OK", None));
        assert_eq!(step, PollStep::Retry);
        assert_eq!(state.transport_failures(), 0);
        assert_eq!(state.server_faults(), 0);
    }

    #[test]
    fn test_transport_budget_allows_exactly_ceiling_failures() {
        let mut state = PollState::new();
        let policy = policy();

        for _ in 0..DEFAULT_RETRY_CEILING {
            assert_eq!(
                state.observe(&policy, ProbeOutcome::TransportUnavailable),
                PollStep::Retry
            );
        }
        assert_eq!(state.transport_failures(), DEFAULT_RETRY_CEILING);

        // The ceiling-plus-first failure is fatal.
        assert_eq!(
            state.observe(&policy, ProbeOutcome::TransportUnavailable),
            PollStep::Abort(PollFailure::ConnectionLost(DEFAULT_RETRY_CEILING))
        );
        assert_eq!(state.transport_failures(), DEFAULT_RETRY_CEILING);
    }

    #[test]
    fn test_server_fault_budget_is_independent() {
        let mut state = PollState::new();
        let policy = PollPolicy::default().with_ceiling(2);
        let fault = || ProbeOutcome::status(500, "Internal Server Error", None);

        assert_eq!(state.observe(&policy, fault()), PollStep::Retry);
        assert_eq!(state.observe(&policy, fault()), PollStep::Retry);
        // Transport budget untouched by server faults.
        assert_eq!(state.transport_failures(), 0);
        assert_eq!(state.server_faults(), 2);

        assert_eq!(
            state.observe(&policy, fault()),
            PollStep::Abort(PollFailure::ServerFault {
                status: 500,
                text: "Internal Server Error".to_string(),
            })
        );
    }

    #[test]
    fn test_other_status_is_fatal_on_first_occurrence() {
        let mut state = PollState::new();
        let step = state.observe(&policy(), ProbeOutcome::status(404, "Not Found", None));
        assert_eq!(
            step,
            PollStep::Abort(PollFailure::Unexpected {
                status: 404,
                text: "Not Found".to_string(),
            })
        );
    }

    #[test]
    fn test_success_resets_nothing() {
        let mut state = PollState::new();
        let policy = policy();

        state.observe(&policy, ProbeOutcome::TransportUnavailable);
        state.observe(&policy, ok_body("still working"));
        // Counters carry across successes; they only grow.
        assert_eq!(state.transport_failures(), 1);
    }

    #[test]
    fn test_connection_lost_notice_counts_attempts() {
        // The ceiling is an attempt count, not a wall-clock span; the
        // notice must not claim a duration the policy delay may not match.
        let failure = PollFailure::ConnectionLost(60);
        assert_eq!(
            failure.to_string(),
            "lost connection to the server after 60 failed attempts"
        );
    }

    #[test]
    fn test_custom_marker() {
        let mut state = PollState::new();
        let policy = PollPolicy::default().with_marker("FINISHED");

        assert_eq!(state.observe(&policy, ok_body("Job Done")), PollStep::Retry);
        assert_eq!(
            state.observe(&policy, ok_body("FINISHED")),
            PollStep::Done("FINISHED".to_string())
        );
    }
}
