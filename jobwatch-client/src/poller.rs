//! Job poller
//!
//! Fixed-interval poll driver: one probe in flight at a time, each readable
//! success body pushed to the progress sink, the decision machine from
//! `jobwatch-core` deciding after every probe whether to sleep and go again,
//! finish, or abort.

use std::sync::Arc;

use jobwatch_core::{JobKind, PollFailure, PollPolicy, PollState, PollStep, ProbeOutcome, SessionId};
use tokio::time;
use tracing::{debug, info, warn};

use crate::sink::ProgressSink;
use crate::transport::StatusTransport;

/// Polls one job until completion, budget exhaustion, or a fatal status.
///
/// A poller owns the retry counters for its session, so two jobs polled
/// concurrently (e.g. a task submission and a saved-results load) never
/// share budget.
pub struct JobPoller {
    transport: Arc<dyn StatusTransport>,
    policy: PollPolicy,
    kind: JobKind,
    session: SessionId,
    state: PollState,
    attempts: u64,
}

impl JobPoller {
    /// Creates a poller with the default policy.
    pub fn new(transport: Arc<dyn StatusTransport>, kind: JobKind, session: SessionId) -> Self {
        Self::with_policy(transport, kind, session, PollPolicy::default())
    }

    /// Creates a poller with an explicit policy.
    pub fn with_policy(
        transport: Arc<dyn StatusTransport>,
        kind: JobKind,
        session: SessionId,
        policy: PollPolicy,
    ) -> Self {
        Self {
            transport,
            policy,
            kind,
            session,
            state: PollState::new(),
            attempts: 0,
        }
    }

    /// Number of probes issued so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Retry accounting for this session.
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Runs the polling loop to its terminal state.
    ///
    /// Probes the status endpoint, sleeping the policy delay between
    /// attempts (measured from response receipt, so the effective period is
    /// at least delay plus request latency). Returns the final body once it
    /// contains the completion marker, or the terminal failure.
    ///
    /// # Arguments
    /// * `sink` - Receives every readable success body as it arrives
    pub async fn run(&mut self, sink: &dyn ProgressSink) -> Result<String, PollFailure> {
        info!(
            "polling {} status for session {} (interval: {:?})",
            self.kind, self.session, self.policy.retry_delay
        );

        loop {
            self.attempts += 1;
            let outcome = self.transport.probe(self.kind, &self.session).await;

            if let ProbeOutcome::Status {
                code: 200,
                body: Some(text),
                ..
            } = &outcome
            {
                sink.update(text);
            }

            match self.state.observe(&self.policy, outcome) {
                PollStep::Done(body) => {
                    info!(
                        "job finished for session {} after {} attempt(s)",
                        self.session, self.attempts
                    );
                    return Ok(body);
                }
                PollStep::Abort(failure) => {
                    warn!(
                        "polling aborted for session {} after {} attempt(s): {}",
                        self.session, self.attempts, failure
                    );
                    return Err(failure);
                }
                PollStep::Retry => {
                    debug!(
                        "session {} still pending (attempt {}, transport failures {}, server faults {})",
                        self.session,
                        self.attempts,
                        self.state.transport_failures(),
                        self.state.server_faults()
                    );
                    time::sleep(self.policy.retry_delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use jobwatch_core::poll::DEFAULT_RETRY_CEILING;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Transport that replays a scripted sequence of probe outcomes and
    /// records when each probe arrived.
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<ProbeOutcome>>,
        probe_times: Mutex<Vec<time::Instant>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<ProbeOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                probe_times: Mutex::new(Vec::new()),
            }
        }

        fn probes(&self) -> u64 {
            self.probe_times.lock().unwrap().len() as u64
        }

        fn probe_times(&self) -> Vec<time::Instant> {
            self.probe_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusTransport for ScriptedTransport {
        async fn probe(&self, _kind: JobKind, _session: &SessionId) -> ProbeOutcome {
            self.probe_times.lock().unwrap().push(time::Instant::now());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ProbeOutcome::TransportUnavailable)
        }

        async fn register(&self, _session: &SessionId) -> Result<String> {
            Ok(String::new())
        }
    }

    /// Sink that records every body it sees.
    struct RecordingSink(Mutex<Vec<String>>);

    impl RecordingSink {
        fn new() -> Self {
            Self(Mutex::new(Vec::new()))
        }

        fn bodies(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ProgressSink for RecordingSink {
        fn update(&self, body: &str) {
            self.0.lock().unwrap().push(body.to_string());
        }
    }

    fn ok_body(body: &str) -> ProbeOutcome {
        ProbeOutcome::status(200, "OK", Some(body.to_string()))
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy::default().with_delay(Duration::ZERO)
    }

    fn poller(transport: Arc<ScriptedTransport>) -> JobPoller {
        JobPoller::with_policy(
            transport,
            JobKind::Task,
            SessionId::new("20260101-0000-1"),
            fast_policy(),
        )
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failures_then_completes() {
        // Three dropped connections, one in-progress body, then the marker.
        let transport = Arc::new(ScriptedTransport::new(vec![
            ProbeOutcome::TransportUnavailable,
            ProbeOutcome::TransportUnavailable,
            ProbeOutcome::TransportUnavailable,
            ok_body("still running"),
            ok_body("<div>all set. Job Done</div>"),
        ]));
        let sink = RecordingSink::new();
        let mut poller = poller(Arc::clone(&transport));

        let body = poller.run(&sink).await.unwrap();

        assert_eq!(body, "<div>all set. Job Done</div>");
        assert_eq!(transport.probes(), 5);
        assert_eq!(poller.attempts(), 5);
        assert_eq!(poller.state().transport_failures(), 3);
        assert_eq!(poller.state().server_faults(), 0);
        // Intermediate and final bodies both reached the sink, in order.
        assert_eq!(
            sink.bodies(),
            vec![
                "still running".to_string(),
                "<div>all set. Job Done</div>".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unexpected_status_aborts_without_retry() {
        let transport = Arc::new(ScriptedTransport::new(vec![ProbeOutcome::status(
            404,
            "Not Found",
            None,
        )]));
        let sink = RecordingSink::new();
        let mut poller = poller(Arc::clone(&transport));

        let failure = poller.run(&sink).await.unwrap_err();

        assert_eq!(
            failure,
            PollFailure::Unexpected {
                status: 404,
                text: "Not Found".to_string(),
            }
        );
        assert_eq!(transport.probes(), 1);
        assert!(sink.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_transport_budget_exhaustion_is_fatal() {
        let outcomes =
            vec![ProbeOutcome::TransportUnavailable; (DEFAULT_RETRY_CEILING + 1) as usize];
        let transport = Arc::new(ScriptedTransport::new(outcomes));
        let mut poller = poller(Arc::clone(&transport));

        let failure = poller.run(&crate::sink::DiscardSink).await.unwrap_err();

        assert_eq!(failure, PollFailure::ConnectionLost(DEFAULT_RETRY_CEILING));
        assert_eq!(transport.probes(), (DEFAULT_RETRY_CEILING + 1) as u64);
        assert_eq!(poller.state().transport_failures(), DEFAULT_RETRY_CEILING);
    }

    #[tokio::test]
    async fn test_in_progress_bodies_never_exhaust_polling() {
        // Far more "still working" bodies than any retry budget.
        let mut outcomes = vec![ok_body("still working"); (DEFAULT_RETRY_CEILING * 2) as usize];
        outcomes.push(ok_body("Job Done"));
        let transport = Arc::new(ScriptedTransport::new(outcomes));
        let mut poller = poller(Arc::clone(&transport));

        let body = poller.run(&crate::sink::DiscardSink).await.unwrap();

        assert_eq!(body, "Job Done");
        assert_eq!(poller.state().transport_failures(), 0);
        assert_eq!(poller.state().server_faults(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_spaced_by_policy_delay() {
        let delay = Duration::from_millis(1000);
        let transport = Arc::new(ScriptedTransport::new(vec![
            ProbeOutcome::TransportUnavailable,
            ok_body("still working"),
            ok_body("Job Done"),
        ]));
        let mut poller = JobPoller::with_policy(
            Arc::clone(&transport) as Arc<dyn StatusTransport>,
            JobKind::Task,
            SessionId::new("20260101-0000-1"),
            PollPolicy::default().with_delay(delay),
        );

        poller.run(&crate::sink::DiscardSink).await.unwrap();

        // Every retry, whatever triggered it, waits the full policy delay
        // from response receipt before the next probe goes out.
        let times = transport.probe_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], delay);
        }
    }

    #[tokio::test]
    async fn test_final_body_delivered_exactly_once() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok_body("working"),
            ok_body("Job Done"),
            // Would be returned if the poller kept probing past completion.
            ok_body("Job Done again"),
        ]));
        let sink = RecordingSink::new();
        let mut poller = poller(Arc::clone(&transport));

        let body = poller.run(&sink).await.unwrap();

        assert_eq!(body, "Job Done");
        assert_eq!(transport.probes(), 2);
        assert_eq!(sink.bodies().len(), 2);
    }
}
