//! Submission configuration.
//!
//! [`SubmitConfig`] is read from `SUBMIT_*` environment variables, or from
//! any key lookup in tests. Values are validated up front and reported as a
//! [`ConfigError`] instead of failing later at request time.

use std::time::Duration;

use reqwest::Url;

/// Default bound on submissions waiting for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default number of submissions allowed on the wire at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Submission configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Endpoint that receives the JSON POST.
    pub endpoint_url: Url,
    /// Per-request timeout. `None` leaves the HTTP stack default in place.
    pub timeout: Option<Duration>,
    /// Treat non-2xx responses as failures instead of completed submissions.
    pub strict_status: bool,
    /// Bound on the dispatcher queue.
    pub queue_capacity: usize,
    /// Maximum concurrent submissions.
    pub max_in_flight: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SubmitConfig {
    /// Configuration for `endpoint_url` with every other value defaulted.
    pub fn new(endpoint_url: Url) -> Self {
        Self {
            endpoint_url,
            timeout: None,
            strict_status: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default          |
    /// |-------------------------|------------------|
    /// | `SUBMIT_ENDPOINT_URL`   | required         |
    /// | `SUBMIT_TIMEOUT_SECS`   | unset (no limit) |
    /// | `SUBMIT_STRICT_STATUS`  | `false`          |
    /// | `SUBMIT_QUEUE_CAPACITY` | `64`             |
    /// | `SUBMIT_MAX_IN_FLIGHT`  | `4`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("SUBMIT_ENDPOINT_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUBMIT_ENDPOINT_URL"))?;
        let endpoint_url = parse_endpoint(raw_url.trim())?;

        let timeout = lookup("SUBMIT_TIMEOUT_SECS")
            .map(|v| parse_positive("SUBMIT_TIMEOUT_SECS", &v))
            .transpose()?
            .map(|secs| Duration::from_secs(secs as u64));

        let strict_status = lookup("SUBMIT_STRICT_STATUS")
            .map(|v| parse_bool("SUBMIT_STRICT_STATUS", &v))
            .transpose()?
            .unwrap_or(false);

        let queue_capacity = lookup("SUBMIT_QUEUE_CAPACITY")
            .map(|v| parse_positive("SUBMIT_QUEUE_CAPACITY", &v))
            .transpose()?
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        let max_in_flight = lookup("SUBMIT_MAX_IN_FLIGHT")
            .map(|v| parse_positive("SUBMIT_MAX_IN_FLIGHT", &v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_IN_FLIGHT);

        Ok(Self {
            endpoint_url,
            timeout,
            strict_status,
            queue_capacity,
            max_in_flight,
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: "SUBMIT_ENDPOINT_URL",
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key: "SUBMIT_ENDPOINT_URL",
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Parse a strictly positive integer.
pub fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a positive integer, got '{raw}'"),
        }),
    }
}

/// Parse `true`/`false` (also `1`/`0`, `yes`/`no`), case-insensitive.
pub fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got '{raw}'"),
        }),
    }
}
