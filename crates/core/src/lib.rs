//! Scanpost domain logic.
//!
//! Pure functions and state with no I/O:
//!
//! - [`decoder`] -- validation and decoding of packed 8-bit binary scans.
//! - [`record`] -- the flat submission record and its field sentinels.
//! - [`rescan`] -- optional suppression of repeated scans.
//! - [`controller`] -- scan/form state owned by a single controller.

pub mod controller;
pub mod decoder;
pub mod error;
pub mod record;
pub mod rescan;
pub mod types;

pub use controller::{CameraPermission, ScanController, ScanOutcome};
pub use decoder::{DecodedPayload, DecodedText};
pub use error::CoreError;
pub use record::{AuxField, SubmissionRecord};
pub use rescan::{RescanFilter, RescanPolicy};
