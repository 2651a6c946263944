//! Background submission dispatch.
//!
//! [`SubmissionDispatcher`] is the hand-off point between the interactive
//! context and the network. [`dispatch`](SubmissionDispatcher::dispatch)
//! never waits: it pushes the record onto a bounded queue and returns a
//! [`SubmissionTicket`] immediately. A queue task pulls records off and runs
//! each one on its own worker task, with at most `max_in_flight` requests on
//! the wire at once.
//!
//! Submissions are independent of each other and of whoever dispatched
//! them. Dropping every dispatcher handle closes the queue, but records
//! already dispatched still run to completion.

use std::sync::Arc;

use scanpost_core::SubmissionRecord;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bus::{OutcomeBus, SubmissionOutcome};
use crate::config::SubmitConfig;
use crate::delivery::submission::{SubmissionClient, SubmissionResult};

// ---------------------------------------------------------------------------
// Ticket / Error
// ---------------------------------------------------------------------------

/// Handle to a dispatched submission.
///
/// Awaiting the outcome is optional and meant for logging; dropping the
/// ticket does not cancel the submission.
#[derive(Debug)]
pub struct SubmissionTicket {
    pub submission_id: Uuid,
    result: oneshot::Receiver<SubmissionResult>,
}

impl SubmissionTicket {
    /// Wait for the submission to finish.
    ///
    /// Returns `None` if the worker was torn down before it could report
    /// (runtime shutdown).
    pub async fn outcome(self) -> Option<SubmissionResult> {
        self.result.await.ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Submission queue is full")]
    QueueFull,

    #[error("Submission dispatcher has shut down")]
    Closed,
}

// ---------------------------------------------------------------------------
// SubmissionDispatcher
// ---------------------------------------------------------------------------

struct Job {
    id: Uuid,
    record: SubmissionRecord,
    reply: oneshot::Sender<SubmissionResult>,
}

/// Cloneable handle to the submission queue.
#[derive(Clone)]
pub struct SubmissionDispatcher {
    queue: mpsc::Sender<Job>,
}

impl SubmissionDispatcher {
    /// Start the queue task on the current tokio runtime.
    ///
    /// Returns the dispatcher handle and the queue task's join handle. The
    /// queue task exits once every dispatcher handle has been dropped.
    pub fn spawn(
        client: SubmissionClient,
        bus: Arc<OutcomeBus>,
        queue_capacity: usize,
        max_in_flight: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let handle = tokio::spawn(run_queue(client, bus, rx, max_in_flight.max(1)));
        (Self { queue: tx }, handle)
    }

    pub fn from_config(
        config: &SubmitConfig,
        client: SubmissionClient,
        bus: Arc<OutcomeBus>,
    ) -> (Self, JoinHandle<()>) {
        Self::spawn(client, bus, config.queue_capacity, config.max_in_flight)
    }

    /// Hand a record to the background queue without waiting.
    pub fn dispatch(&self, record: SubmissionRecord) -> Result<SubmissionTicket, DispatchError> {
        let id = Uuid::new_v4();
        let (reply, result) = oneshot::channel();

        self.queue
            .try_send(Job { id, record, reply })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::warn!(submission_id = %id, "Submission queue full, record dropped");
                    DispatchError::QueueFull
                }
                mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
            })?;

        tracing::debug!(submission_id = %id, "Submission dispatched");
        Ok(SubmissionTicket {
            submission_id: id,
            result,
        })
    }
}

/// Pull jobs off the queue and run each on its own task.
async fn run_queue(
    client: SubmissionClient,
    bus: Arc<OutcomeBus>,
    mut rx: mpsc::Receiver<Job>,
    max_in_flight: usize,
) {
    let permits = Arc::new(Semaphore::new(max_in_flight));

    while let Some(job) = rx.recv().await {
        // The semaphore is never closed, so acquisition only fails on a bug.
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let client = client.clone();
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            let _permit = permit;
            let result = client.submit(&job.record).await;
            bus.publish(SubmissionOutcome::new(
                job.id,
                client.endpoint().as_str(),
                result.clone(),
            ));
            // The ticket may have been dropped; that is fine.
            let _ = job.reply.send(result);
        });
    }

    tracing::debug!("Submission queue closed");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
