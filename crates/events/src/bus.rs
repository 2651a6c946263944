//! In-process outcome bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`OutcomeBus`] fans out one [`SubmissionOutcome`] per finished submission.
//! It is designed to be shared via `Arc<OutcomeBus>` between the dispatcher
//! and any number of observers (the outcome logger, a front end that wants
//! to surface failures).

use chrono::Utc;
use scanpost_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::delivery::submission::SubmissionResult;

// ---------------------------------------------------------------------------
// SubmissionOutcome
// ---------------------------------------------------------------------------

/// A finished submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// Id assigned when the record was dispatched.
    pub submission_id: Uuid,

    /// Endpoint the record was posted to.
    pub endpoint: String,

    pub result: SubmissionResult,

    /// When the submission finished (UTC).
    pub finished_at: Timestamp,
}

impl SubmissionOutcome {
    pub fn new(submission_id: Uuid, endpoint: impl Into<String>, result: SubmissionResult) -> Self {
        Self {
            submission_id,
            endpoint: endpoint.into(),
            result,
            finished_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutcomeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of submission outcomes.
///
/// # Usage
///
/// ```rust
/// use scanpost_events::bus::OutcomeBus;
///
/// let bus = OutcomeBus::default();
/// let _rx = bus.subscribe();
/// ```
pub struct OutcomeBus {
    sender: broadcast::Sender<SubmissionOutcome>,
}

impl OutcomeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed outcomes are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an outcome to all current subscribers.
    ///
    /// If there are no active subscribers the outcome is silently dropped.
    pub fn publish(&self, outcome: SubmissionOutcome) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(outcome);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionOutcome> {
        self.sender.subscribe()
    }
}

impl Default for OutcomeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
