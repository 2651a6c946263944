//! Headless relay wiring.
//!
//! [`run`] connects a capture device to the submission pipeline: it starts
//! the outcome bus, the outcome logger and the dispatcher, runs one
//! [`ScanSession`] until it is cancelled or the input ends, and then waits
//! for every dispatched submission to be logged.

use std::sync::Arc;

use scanpost_core::{CameraPermission, ScanController};
use scanpost_events::{
    OutcomeBus, OutcomeLogger, SubmissionClient, SubmissionDispatcher, SubmissionError,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::capture::{CaptureDevice, CaptureError};
use crate::config::ScannerConfig;
use crate::session::{ScanSession, SessionReport};

/// Log filter used when `RUST_LOG` is unset. Covers the library crates and
/// the `scanpost-relay` binary target.
pub const DEFAULT_LOG_FILTER: &str = "scanpost_relay=info,scanpost_scanner=info,scanpost_events=info";

/// `RUST_LOG` if set and valid, otherwise [`DEFAULT_LOG_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] SubmissionError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

#[derive(Debug)]
pub struct RelayReport {
    pub session: SessionReport,
    /// Outcomes written by the logger before it shut down.
    pub outcomes_logged: usize,
}

/// Run one relay session over `device`.
///
/// Returns once the session has ended and every submission it dispatched
/// has finished and been logged.
pub async fn run<D: CaptureDevice>(
    config: ScannerConfig,
    device: D,
    cancel: CancellationToken,
) -> Result<RelayReport, RelayError> {
    let client = SubmissionClient::from_config(&config.submit)?;

    let bus = Arc::new(OutcomeBus::default());
    let logger = tokio::spawn(OutcomeLogger::run(bus.subscribe()));
    let (dispatcher, queue) =
        SubmissionDispatcher::from_config(&config.submit, client, Arc::clone(&bus));

    // Piped input has no camera permission to ask for.
    let mut controller = ScanController::new(config.rescan).with_defaults(config.form_defaults);
    controller.permission_changed(CameraPermission::Granted);

    // No interactive form is attached; keep the sender so the channel stays open.
    let (_form_tx, form_rx) = mpsc::channel(16);

    let session = ScanSession::new(device, controller, dispatcher, form_rx)
        .auto_submit(config.auto_submit)
        .run(cancel)
        .await;

    // The session dropped the last dispatcher handle, so the queue drains and
    // exits. Worker tasks hold the bus until they publish, so the logger sees
    // the bus close only after the last in-flight submission.
    let _ = queue.await;
    drop(bus);
    let outcomes_logged = logger.await.unwrap_or_default();

    Ok(RelayReport {
        session: session?,
        outcomes_logged,
    })
}

#[cfg(test)]
mod tests {
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn default_filter_enables_relay_and_library_targets() {
        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "scanpost_relay", Level::INFO));
            assert!(tracing::enabled!(target: "scanpost_relay", Level::ERROR));
            assert!(tracing::enabled!(target: "scanpost_scanner::session", Level::INFO));
            assert!(tracing::enabled!(target: "scanpost_events::outcome_log", Level::INFO));
        });
    }

    #[test]
    fn capture_errors_display_unwrapped() {
        let err = RelayError::Capture(CaptureError::PermissionDenied);
        assert_eq!(err.to_string(), "Camera permission not granted");
    }
}
