//! `scanpost-scanner` library crate.
//!
//! Collaborator seams (capture device, form input), the scan session that
//! ties them to the controller and the submission dispatcher, and the
//! headless stdin capture and relay wiring used by the `scanpost-relay`
//! binary.

pub mod capture;
pub mod config;
pub mod form;
pub mod relay;
pub mod session;
pub mod stdin_capture;
