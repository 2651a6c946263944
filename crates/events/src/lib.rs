//! Scanpost submission delivery.
//!
//! This crate moves submission records off the interactive context and onto
//! the network:
//!
//! - [`SubmissionClient`] -- one-shot JSON POST of a record, result only.
//! - [`SubmissionDispatcher`] -- bounded background queue that runs
//!   submissions on worker tasks, fire-and-forget.
//! - [`OutcomeBus`] -- broadcast of every finished submission.
//! - [`OutcomeLogger`] -- background subscriber that logs each outcome.
//! - [`SubmitConfig`] -- environment-driven configuration.

pub mod bus;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod outcome_log;

pub use bus::{OutcomeBus, SubmissionOutcome};
pub use config::{ConfigError, SubmitConfig};
pub use delivery::submission::{SubmissionClient, SubmissionError, SubmissionResult};
pub use dispatcher::{DispatchError, SubmissionDispatcher, SubmissionTicket};
pub use outcome_log::OutcomeLogger;
