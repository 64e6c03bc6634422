//! Jobwatch Core
//!
//! Core types for the jobwatch polling client.
//!
//! This crate contains:
//! - Session identity: session identifiers and job kinds
//! - The poll policy and decision state machine (pure, no I/O)

pub mod poll;
pub mod session;

pub use poll::{PollFailure, PollPolicy, PollState, PollStep, ProbeOutcome};
pub use session::{JobKind, SessionId};
