//! Outcome logging service.
//!
//! [`OutcomeLogger`] subscribes to the [`OutcomeBus`](crate::bus::OutcomeBus)
//! and writes one log line per finished submission. Submission results are
//! never acted on beyond this; it is the only place a transport failure
//! becomes observable.

use tokio::sync::broadcast;

use crate::bus::SubmissionOutcome;
use crate::delivery::submission::SubmissionResult;

/// Background service that logs submission outcomes.
pub struct OutcomeLogger;

impl OutcomeLogger {
    /// Run the logging loop until the bus is dropped.
    ///
    /// Returns the number of outcomes logged.
    pub async fn run(mut receiver: broadcast::Receiver<SubmissionOutcome>) -> usize {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(outcome) => {
                    Self::log(&outcome);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Outcome logger lagged, some outcomes were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Outcome bus closed, logger shutting down");
                    break;
                }
            }
        }
        logged
    }

    /// Write a single outcome to the log.
    pub fn log(outcome: &SubmissionOutcome) {
        match &outcome.result {
            SubmissionResult::Success { status } => {
                tracing::info!(
                    submission_id = %outcome.submission_id,
                    endpoint = %outcome.endpoint,
                    status,
                    "Submission completed"
                );
            }
            SubmissionResult::Failure { description } => {
                tracing::error!(
                    submission_id = %outcome.submission_id,
                    endpoint = %outcome.endpoint,
                    error = %description,
                    "Submission failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::bus::OutcomeBus;

    #[tokio::test]
    async fn logs_every_outcome_until_bus_closes() {
        let bus = OutcomeBus::default();
        let handle = tokio::spawn(OutcomeLogger::run(bus.subscribe()));

        bus.publish(SubmissionOutcome::new(
            Uuid::new_v4(),
            "http://localhost/",
            SubmissionResult::Success { status: 200 },
        ));
        bus.publish(SubmissionOutcome::new(
            Uuid::new_v4(),
            "http://localhost/",
            SubmissionResult::Failure {
                description: "connection refused".into(),
            },
        ));
        drop(bus);

        assert_eq!(handle.await.unwrap(), 2);
    }
}
