//! Scan session: the interactive context.
//!
//! A [`ScanSession`] owns the [`ScanController`] for as long as the scan
//! screen is up. It binds the capture device on start, applies frames and
//! form events to the controller one at a time, hands finished records to
//! the [`SubmissionDispatcher`], and releases the capture device when the
//! session is cancelled or the frame stream ends.
//!
//! Cancelling a session does not cancel submissions it already dispatched.

use scanpost_core::{CameraPermission, ScanController, ScanOutcome};
use scanpost_events::SubmissionDispatcher;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::capture::{CaptureDevice, CaptureError, Frame};
use crate::form::FormEvent;

/// Counters and final state returned when a session ends.
#[derive(Debug)]
pub struct SessionReport {
    pub controller: ScanController,
    pub frames_seen: usize,
    pub scans_accepted: usize,
    pub scans_rejected: usize,
    pub submissions_dispatched: usize,
}

pub struct ScanSession<D: CaptureDevice> {
    device: D,
    forms: mpsc::Receiver<FormEvent>,
    state: SessionState,
}

/// Everything the event handlers touch, kept apart from the channels the
/// event loop polls.
struct SessionState {
    controller: ScanController,
    dispatcher: SubmissionDispatcher,
    auto_submit: bool,
    frames_seen: usize,
    scans_accepted: usize,
    scans_rejected: usize,
    submissions_dispatched: usize,
}

impl<D: CaptureDevice> ScanSession<D> {
    pub fn new(
        device: D,
        controller: ScanController,
        dispatcher: SubmissionDispatcher,
        forms: mpsc::Receiver<FormEvent>,
    ) -> Self {
        Self {
            device,
            forms,
            state: SessionState {
                controller,
                dispatcher,
                auto_submit: false,
                frames_seen: 0,
                scans_accepted: 0,
                scans_rejected: 0,
                submissions_dispatched: 0,
            },
        }
    }

    /// Submit every accepted scan immediately, without waiting for a
    /// submit action from the form.
    pub fn auto_submit(mut self, enabled: bool) -> Self {
        self.state.auto_submit = enabled;
        self
    }

    /// Run until `cancel` fires or the capture device stops delivering
    /// frames.
    ///
    /// Fails without binding the device when the camera permission has not
    /// been granted.
    pub async fn run(self, cancel: CancellationToken) -> Result<SessionReport, CaptureError> {
        let Self {
            mut device,
            mut forms,
            mut state,
        } = self;

        if state.controller.permission() != CameraPermission::Granted {
            tracing::warn!(
                prompt = state.controller.permission_prompt().unwrap_or_default(),
                "Camera permission not granted, scan session not started"
            );
            return Err(CaptureError::PermissionDenied);
        }

        let mut frames = device.bind().await?;
        tracing::info!("Capture device bound");

        let mut forms_open = true;
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("Scan session cancelled");
                    break;
                }
                event = forms.recv(), if forms_open => match event {
                    Some(event) => state.handle_form(event),
                    None => forms_open = false,
                },
                frame = frames.recv() => match frame {
                    Some(frame) => state.handle_frame(frame),
                    None => {
                        tracing::info!("Capture stream ended");
                        break;
                    }
                },
            }
        }

        // Frames still queued are dropped here, which runs their release hooks.
        drop(frames);
        device.unbind().await;
        tracing::info!(
            frames_seen = state.frames_seen,
            submissions = state.submissions_dispatched,
            "Capture device released"
        );

        Ok(state.into_report())
    }
}

impl SessionState {
    fn handle_frame(&mut self, frame: Frame) {
        let (raw, release) = frame.into_parts();
        self.frames_seen += 1;

        if let Some(raw) = raw {
            let now = tokio::time::Instant::now().into_std();
            match self.controller.scan_received(&raw, now) {
                ScanOutcome::Accepted(text) => {
                    self.scans_accepted += 1;
                    tracing::info!(decoded = %text, "Scan accepted");
                    if self.auto_submit {
                        self.submit();
                    }
                }
                ScanOutcome::Rejected(reason) => {
                    self.scans_rejected += 1;
                    tracing::info!(%reason, "Scan rejected");
                }
                ScanOutcome::Suppressed => {
                    tracing::trace!("Repeated scan suppressed");
                }
                ScanOutcome::Ignored => {
                    tracing::trace!("Scan ignored");
                }
            }
        }

        release.release();
    }

    fn handle_form(&mut self, event: FormEvent) {
        match event {
            FormEvent::FieldEdited { field, value } => self.controller.field_edited(field, value),
            FormEvent::SubmitPressed => self.submit(),
            FormEvent::Dismissed => self.controller.form_dismissed(),
        }
    }

    fn submit(&mut self) {
        let record = match self.controller.submit_pressed() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Submit ignored");
                return;
            }
        };

        match self.dispatcher.dispatch(record) {
            Ok(ticket) => {
                self.submissions_dispatched += 1;
                tracing::debug!(submission_id = %ticket.submission_id, "Record handed to dispatcher");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Record not dispatched");
            }
        }
    }

    fn into_report(self) -> SessionReport {
        SessionReport {
            controller: self.controller,
            frames_seen: self.frames_seen,
            scans_accepted: self.scans_accepted,
            scans_rejected: self.scans_rejected,
            submissions_dispatched: self.submissions_dispatched,
        }
    }
}
