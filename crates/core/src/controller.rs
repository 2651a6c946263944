//! Scan screen state and its transitions.
//!
//! [`ScanController`] owns everything the scan screen shows: camera
//! permission, the last decoded text, form visibility, form field values,
//! and the inline status message. It changes only through the named
//! transitions below, so it can be driven and tested without a rendering
//! surface:
//!
//! - [`permission_changed`](ScanController::permission_changed)
//! - [`scan_received`](ScanController::scan_received)
//! - [`field_edited`](ScanController::field_edited)
//! - [`submit_pressed`](ScanController::submit_pressed)
//! - [`form_dismissed`](ScanController::form_dismissed)

use std::collections::BTreeMap;
use std::time::Instant;

use crate::decoder::{self, DecodedPayload, DecodedText};
use crate::error::CoreError;
use crate::record::{AuxField, SubmissionRecord};
use crate::rescan::{RescanFilter, RescanPolicy};

/// Prompt shown the first time, or when the user asked not to be asked again.
pub const PERMISSION_PROMPT: &str =
    "Camera access is needed to scan codes. Grant permission to start scanning.";

/// Prompt shown after the user has denied the permission once.
pub const PERMISSION_RATIONALE: &str =
    "Scanning reads codes through the camera and does not work without it. \
     Grant camera permission to continue.";

/// Status message shown after a record has been handed off for submission.
pub const SUBMITTED_MESSAGE: &str = "Submitted";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPermission {
    Granted,
    Denied {
        /// The platform allows explaining why the permission is needed.
        show_rationale: bool,
    },
}

impl Default for CameraPermission {
    fn default() -> Self {
        Self::Denied {
            show_rationale: false,
        }
    }
}

/// What happened to a single raw scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan decoded and is now the current payload.
    Accepted(DecodedText),
    /// The scan failed validation; the reason is shown inline.
    Rejected(String),
    /// A repeat of the current payload inside the rescan window.
    Suppressed,
    /// Scans are not processed while the camera permission is missing.
    Ignored,
}

// ---------------------------------------------------------------------------
// ScanController
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ScanController {
    permission: CameraPermission,
    last_decoded: Option<DecodedText>,
    form_visible: bool,
    fields: BTreeMap<AuxField, String>,
    defaults: BTreeMap<AuxField, String>,
    status_message: Option<String>,
    rescan: RescanFilter,
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new(RescanPolicy::default())
    }
}

impl ScanController {
    pub fn new(policy: RescanPolicy) -> Self {
        Self {
            permission: CameraPermission::default(),
            last_decoded: None,
            form_visible: false,
            fields: BTreeMap::new(),
            defaults: BTreeMap::new(),
            status_message: None,
            rescan: RescanFilter::new(policy),
        }
    }

    /// Pre-fill form fields. The form is reset to these values after every
    /// submission.
    pub fn with_defaults(mut self, defaults: BTreeMap<AuxField, String>) -> Self {
        self.fields = defaults.clone();
        self.defaults = defaults;
        self
    }

    // -- Accessors -----------------------------------------------------------

    pub fn permission(&self) -> CameraPermission {
        self.permission
    }

    pub fn last_decoded(&self) -> Option<&DecodedText> {
        self.last_decoded.as_ref()
    }

    pub fn form_visible(&self) -> bool {
        self.form_visible
    }

    pub fn field(&self, field: AuxField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Text to show in place of the camera preview, or `None` once the
    /// permission is granted.
    pub fn permission_prompt(&self) -> Option<&'static str> {
        match self.permission {
            CameraPermission::Granted => None,
            CameraPermission::Denied {
                show_rationale: true,
            } => Some(PERMISSION_RATIONALE),
            CameraPermission::Denied {
                show_rationale: false,
            } => Some(PERMISSION_PROMPT),
        }
    }

    // -- Transitions ---------------------------------------------------------

    pub fn permission_changed(&mut self, permission: CameraPermission) {
        self.permission = permission;
    }

    /// Process one raw scan from the recognition pipeline.
    pub fn scan_received(&mut self, raw: &str, now: Instant) -> ScanOutcome {
        if self.permission != CameraPermission::Granted {
            return ScanOutcome::Ignored;
        }

        match decoder::inspect(raw) {
            DecodedPayload::Invalid(reason) => {
                self.status_message = Some(reason.clone());
                ScanOutcome::Rejected(reason)
            }
            DecodedPayload::Valid(text) => {
                if !self.rescan.admit(text.as_str(), now) {
                    return ScanOutcome::Suppressed;
                }
                self.last_decoded = Some(text.clone());
                self.form_visible = true;
                self.status_message = None;
                ScanOutcome::Accepted(text)
            }
        }
    }

    pub fn field_edited(&mut self, field: AuxField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Build the record for the current payload and reset the form.
    ///
    /// Fails when no scan has been accepted yet.
    pub fn submit_pressed(&mut self) -> Result<SubmissionRecord, CoreError> {
        let decoded = self.last_decoded.as_ref().ok_or_else(|| {
            CoreError::Validation("No scanned payload to submit".to_string())
        })?;

        let record = SubmissionRecord::from_fields(decoded, &self.fields);

        self.fields = self.defaults.clone();
        self.form_visible = false;
        self.status_message = Some(SUBMITTED_MESSAGE.to_string());

        Ok(record)
    }

    /// Hide the form without submitting. Field values are kept.
    pub fn form_dismissed(&mut self) {
        self.form_visible = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::record::NOT_APPLICABLE;

    const HELLO: &str = "01001000 01100101 01101100 01101100 01101111";

    fn granted() -> ScanController {
        let mut c = ScanController::default();
        c.permission_changed(CameraPermission::Granted);
        c
    }

    // -- Permission ----------------------------------------------------------

    #[test]
    fn scans_are_ignored_until_permission_granted() {
        let mut c = ScanController::default();
        assert_eq!(c.permission_prompt(), Some(PERMISSION_PROMPT));
        assert_eq!(c.scan_received(HELLO, Instant::now()), ScanOutcome::Ignored);
        assert!(c.last_decoded().is_none());
    }

    #[test]
    fn rationale_prompt_after_denial() {
        let mut c = ScanController::default();
        c.permission_changed(CameraPermission::Denied {
            show_rationale: true,
        });
        assert_eq!(c.permission_prompt(), Some(PERMISSION_RATIONALE));
        c.permission_changed(CameraPermission::Granted);
        assert_eq!(c.permission_prompt(), None);
    }

    // -- Scans ---------------------------------------------------------------

    #[test]
    fn valid_scan_is_accepted_and_shows_form() {
        let mut c = granted();
        let outcome = c.scan_received(HELLO, Instant::now());

        assert_matches!(outcome, ScanOutcome::Accepted(ref t) if t.as_str() == "Hello");
        assert_eq!(c.last_decoded().map(DecodedText::as_str), Some("Hello"));
        assert!(c.form_visible());
        assert!(c.status_message().is_none());
    }

    #[test]
    fn invalid_scan_sets_inline_message_and_keeps_previous_payload() {
        let mut c = granted();
        c.scan_received(HELLO, Instant::now());
        let outcome = c.scan_received("0102", Instant::now());

        assert_matches!(outcome, ScanOutcome::Rejected(_));
        assert!(c.status_message().unwrap().contains("non-binary"));
        assert_eq!(c.last_decoded().map(DecodedText::as_str), Some("Hello"));
    }

    #[test]
    fn next_valid_scan_clears_inline_message() {
        let mut c = granted();
        c.scan_received("xyz", Instant::now());
        assert!(c.status_message().is_some());
        c.scan_received(HELLO, Instant::now());
        assert!(c.status_message().is_none());
    }

    #[test]
    fn repeats_inside_rescan_window_are_suppressed() {
        let mut c = ScanController::new(RescanPolicy::new(Duration::from_secs(2)));
        c.permission_changed(CameraPermission::Granted);
        let t0 = Instant::now();

        assert_matches!(c.scan_received(HELLO, t0), ScanOutcome::Accepted(_));
        assert_eq!(
            c.scan_received(HELLO, t0 + Duration::from_millis(10)),
            ScanOutcome::Suppressed
        );
    }

    #[test]
    fn repeats_are_accepted_without_rescan_policy() {
        let mut c = granted();
        let t0 = Instant::now();
        assert_matches!(c.scan_received(HELLO, t0), ScanOutcome::Accepted(_));
        assert_matches!(c.scan_received(HELLO, t0), ScanOutcome::Accepted(_));
    }

    // -- Submit --------------------------------------------------------------

    #[test]
    fn submit_without_scan_fails() {
        let mut c = granted();
        assert_matches!(c.submit_pressed(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn submit_builds_record_and_resets_form() {
        let mut c = granted();
        c.scan_received(HELLO, Instant::now());
        c.field_edited(AuxField::Agent, " Bob ");
        c.field_edited(AuxField::InOut, "");

        let record = c.submit_pressed().unwrap();

        assert_eq!(record.decoded_text, "Hello");
        assert_eq!(record.agent, "Bob");
        assert_eq!(record.in_out, NOT_APPLICABLE);
        assert!(!c.form_visible());
        assert!(c.field(AuxField::Agent).is_none());
        assert_eq!(c.status_message(), Some(SUBMITTED_MESSAGE));
    }

    #[test]
    fn defaults_are_restored_after_submit() {
        let defaults = BTreeMap::from([(AuxField::Manager, "Alice".to_string())]);
        let mut c = ScanController::default().with_defaults(defaults);
        c.permission_changed(CameraPermission::Granted);
        c.scan_received(HELLO, Instant::now());
        c.field_edited(AuxField::Manager, "Carol");

        let record = c.submit_pressed().unwrap();

        assert_eq!(record.manager, "Carol");
        assert_eq!(c.field(AuxField::Manager), Some("Alice"));
    }

    #[test]
    fn dismiss_keeps_field_values() {
        let mut c = granted();
        c.scan_received(HELLO, Instant::now());
        c.field_edited(AuxField::OtherEquip, "ladder");
        c.form_dismissed();

        assert!(!c.form_visible());
        assert_eq!(c.field(AuxField::OtherEquip), Some("ladder"));
    }
}
