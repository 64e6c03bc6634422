//! Progress sinks
//!
//! Every readable success body, terminal or not, is pushed to a sink as it
//! arrives. The sink plays the role of an output area that gets overwritten
//! on each poll: observers see intermediate "still working" bodies too, not
//! just the final one.

/// Receives response bodies as polling progresses.
pub trait ProgressSink: Send + Sync {
    /// Called with each readable success body, including the final one.
    fn update(&self, body: &str);
}

/// Sink that drops everything.
pub struct DiscardSink;

impl ProgressSink for DiscardSink {
    fn update(&self, _body: &str) {}
}
