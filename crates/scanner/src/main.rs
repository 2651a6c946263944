//! `scanpost-relay` -- headless scan relay.
//!
//! Reads raw scans from stdin (one per line), validates and decodes them,
//! and posts each accepted payload as a JSON record to the configured
//! endpoint. Form fields come from `SCAN_FIELD_*` environment variables.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default | Description                        |
//! |-----------------------------|----------|---------|------------------------------------|
//! | `SUBMIT_ENDPOINT_URL`       | yes      | --      | Endpoint receiving the JSON POST   |
//! | `SUBMIT_TIMEOUT_SECS`       | no       | none    | Per-request timeout                |
//! | `SUBMIT_STRICT_STATUS`      | no       | `false` | Count non-2xx responses as failed  |
//! | `SUBMIT_QUEUE_CAPACITY`     | no       | `64`    | Pending submission bound           |
//! | `SUBMIT_MAX_IN_FLIGHT`      | no       | `4`     | Concurrent submissions             |
//! | `RESCAN_SUPPRESS_WINDOW_MS` | no       | `0`     | Drop repeats inside this window    |
//! | `SCAN_AUTO_SUBMIT`          | no       | `true`  | Submit every accepted scan         |
//! | `SCAN_FIELD_*`              | no       | --      | Form field values                  |

use scanpost_scanner::config::ScannerConfig;
use scanpost_scanner::relay::{self, RelayError};
use scanpost_scanner::stdin_capture::LineCapture;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(relay::env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ScannerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        endpoint = %config.submit.endpoint_url,
        auto_submit = config.auto_submit,
        rescan_window_ms = config.rescan.window.as_millis() as u64,
        "Starting scanpost-relay",
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let code = match relay::run(config, LineCapture::stdin(), cancel).await {
        Ok(report) => {
            tracing::info!(
                frames = report.session.frames_seen,
                accepted = report.session.scans_accepted,
                rejected = report.session.scans_rejected,
                submitted = report.session.submissions_dispatched,
                logged = report.outcomes_logged,
                "Scan session finished"
            );
            0
        }
        Err(e @ RelayError::Client(_)) => {
            tracing::error!(error = %e, "Relay not started");
            1
        }
        Err(e) => {
            tracing::error!(error = %e, "Scan session failed");
            1
        }
    };

    // A pending stdin read sits on a blocking thread that runtime shutdown
    // would wait for, so exit here instead of returning.
    std::process::exit(code);
}
