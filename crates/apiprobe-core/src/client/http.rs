//! HTTP layer: one attempt, timing, status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::request::{Outcome, RequestSpec};
use crate::timer::measure;

/// Status and decoded body of a single response.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub payload: Option<Value>,
}

/// HTTP backend (holds the reqwest client and its timeout).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) timeout: Duration,
}

impl HttpBackend {
    /// One attempt that treats any non-2xx status as a failure.
    pub(crate) async fn attempt(&self, spec: &RequestSpec) -> ProbeResult<Outcome> {
        let timed = measure(self.send(spec)).await;
        let elapsed_ms = timed.elapsed_ms();
        let response = timed.value?;

        match response.status {
            200..=299 => Ok(Outcome {
                elapsed_ms,
                status_code: Some(response.status),
                payload: response.payload,
                error: None,
            }),
            status => Err(ProbeError::HttpStatus {
                status,
                body: body_text(response.payload.as_ref()),
            }),
        }
    }

    /// One attempt that returns non-2xx responses as completed outcomes.
    pub(crate) async fn observe(&self, spec: &RequestSpec) -> ProbeResult<Outcome> {
        let timed = measure(self.send(spec)).await;
        let elapsed_ms = timed.elapsed_ms();
        let response = timed.value?;

        let error = match response.status {
            200..=299 => None,
            status => Some(format!("HTTP {status}")),
        };

        Ok(Outcome {
            elapsed_ms,
            status_code: Some(response.status),
            payload: response.payload,
            error,
        })
    }

    async fn send(&self, spec: &RequestSpec) -> ProbeResult<RawResponse> {
        let mut request = self.client.request(spec.method().as_reqwest(), spec.url());

        if !spec.query().is_empty() {
            request = request.query(spec.query());
        }

        if let Some(body) = spec.body() {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.map_error(e))?;

        debug!(url = %spec.url(), status, bytes = text.len(), "response received");

        Ok(RawResponse {
            status,
            payload: decode_body(&text),
        })
    }

    fn map_error(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout {
                timeout: self.timeout,
            }
        } else {
            ProbeError::from(err)
        }
    }
}

/// JSON when it parses, otherwise the raw text; `None` for an empty body.
fn decode_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

fn body_text(payload: Option<&Value>) -> String {
    match payload {
        None => String::new(),
        Some(Value::String(s)) => s.chars().take(200).collect(),
        Some(v) => v.to_string().chars().take(200).collect(),
    }
}
