//! One-shot JSON submission of a record.
//!
//! [`SubmissionClient`] serializes a [`SubmissionRecord`] as a flat JSON
//! object and POSTs it to the configured endpoint. There is no retry: every
//! call ends in exactly one [`SubmissionResult`], and transport errors are
//! folded into [`SubmissionResult::Failure`] rather than returned to the
//! caller.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use scanpost_core::SubmissionRecord;
use serde::Serialize;

use crate::config::SubmitConfig;

// ---------------------------------------------------------------------------
// Result / Error
// ---------------------------------------------------------------------------

/// Outcome of a single submission. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionResult {
    /// A response was received.
    Success { status: u16 },
    /// The request could not be completed.
    Failure { description: String },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Error type for submission failures.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The record could not be encoded as JSON.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The endpoint returned a non-2xx status and strict status checking is on.
    #[error("Endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// SubmissionClient
// ---------------------------------------------------------------------------

/// Posts submission records to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    client: reqwest::Client,
    endpoint: Url,
    strict_status: bool,
}

impl SubmissionClient {
    /// Client for `endpoint` with no timeout and lenient status handling.
    pub fn new(endpoint: Url) -> Result<Self, SubmissionError> {
        Self::build(endpoint, None, false)
    }

    pub fn from_config(config: &SubmitConfig) -> Result<Self, SubmissionError> {
        Self::build(
            config.endpoint_url.clone(),
            config.timeout,
            config.strict_status,
        )
    }

    fn build(
        endpoint: Url,
        timeout: Option<Duration>,
        strict_status: bool,
    ) -> Result<Self, SubmissionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
            strict_status,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit `record` to the configured endpoint.
    pub async fn submit(&self, record: &SubmissionRecord) -> SubmissionResult {
        self.submit_to(record, &self.endpoint).await
    }

    /// Submit `record` to an explicit endpoint.
    ///
    /// Any response counts as `Success` unless strict status checking is
    /// enabled, in which case non-2xx responses become `Failure`.
    pub async fn submit_to(&self, record: &SubmissionRecord, endpoint: &Url) -> SubmissionResult {
        match self.try_submit(record, endpoint).await {
            Ok(status) => {
                tracing::debug!(%endpoint, status, "Submission response received");
                SubmissionResult::Success { status }
            }
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "Submission failed");
                SubmissionResult::Failure {
                    description: e.to_string(),
                }
            }
        }
    }

    /// Execute a single POST request and return the response status.
    async fn try_submit(
        &self,
        record: &SubmissionRecord,
        endpoint: &Url,
    ) -> Result<u16, SubmissionError> {
        let body = serde_json::to_vec(record)?;

        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if self.strict_status && !status.is_success() {
            return Err(SubmissionError::HttpStatus(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
