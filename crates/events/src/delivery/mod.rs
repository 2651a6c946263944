//! Outbound delivery channels for submission records.

pub mod submission;
