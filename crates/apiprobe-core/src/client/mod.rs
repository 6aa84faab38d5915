//! Retrying HTTP client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::{debug, warn};

use crate::backoff::RetryPolicy;
use crate::config::HarnessConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::request::{Outcome, RequestSpec};

mod http;

use http::HttpBackend;

pub const PROBE_USER_AGENT: &str = concat!("apiprobe/", env!("CARGO_PKG_VERSION"));

/// HTTP client with per-call retry.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RetryingClient {
    http: HttpBackend,
}

impl RetryingClient {
    pub fn new(config: &HarnessConfig) -> ProbeResult<Self> {
        Self::with_timeout(config.timeout())
    }

    pub fn with_timeout(timeout: Duration) -> ProbeResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(PROBE_USER_AGENT));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProbeError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend { client, timeout },
        })
    }

    /// Issue `spec`, retrying transport failures and non-2xx statuses
    /// according to `policy`.
    ///
    /// `elapsed_ms` of the returned outcome covers the successful attempt
    /// only, not the failed attempts or backoff waits before it. Once every
    /// attempt has failed, [`ProbeError::RequestFailed`] carries the last
    /// error.
    pub async fn execute(&self, spec: &RequestSpec, policy: &RetryPolicy) -> ProbeResult<Outcome> {
        let max_attempts = policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(request = %spec, attempt, max_attempts, "sending request");

            match self.http.attempt(spec).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let backoff = policy.delay(attempt);
                    warn!(
                        error = %e,
                        url = %spec.url(),
                        retry = attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return Err(ProbeError::RequestFailed {
                        url: spec.url().to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    })
                }
            }
        }
    }

    /// Issue `spec` once. A non-2xx response is not an error here: it comes
    /// back as an outcome with its status, payload and `error` set, so
    /// negative lookups can be asserted on. Transport failures still fail.
    pub async fn execute_once(&self, spec: &RequestSpec) -> ProbeResult<Outcome> {
        debug!(request = %spec, "sending request (no retry)");
        self.http.observe(spec).await
    }

    pub fn timeout(&self) -> Duration {
        self.http.timeout
    }
}
