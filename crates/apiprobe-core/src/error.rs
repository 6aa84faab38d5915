//! Error types for the probe harness.

use std::time::Duration;

/// Harness errors.
///
/// Business-level mismatches found while correlating two APIs are not
/// errors; they are reported as [`crate::correlate::CorrelationCheck`]
/// values with `holds = false`.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Network failure: DNS, connection refused, reset, TLS.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Non-2xx response.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// All attempts were used up; carries the last underlying error.
    #[error("request to {url} failed after {attempts} attempt(s): {last}")]
    RequestFailed {
        url: String,
        attempts: u32,
        last: Box<ProbeError>,
    },

    /// One or more requests of a batch failed irrecoverably.
    #[error("batch failed: {}", describe_failures(.failures))]
    BatchFailed { failures: Vec<BatchFailure> },

    /// A response body could not be decoded, or lacks a required field.
    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },

    /// The result sink could not be written.
    #[error("result sink error: {message}")]
    Sink { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// One failed entry of a batch, identified by its input position.
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub url: String,
    pub error: ProbeError,
}

fn describe_failures(failures: &[BatchFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("#{} {} ({})", f.index, f.url, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ProbeError {
    /// Whether a fresh attempt of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }

    /// Status code of the last HTTP response seen, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::RequestFailed { last, .. } => last.status_code(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured value on the error
            return Self::Timeout {
                timeout: Duration::ZERO,
            };
        }
        Self::Transport {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::Sink {
            message: err.to_string(),
        }
    }
}

/// Result type for harness operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProbeError::Transport {
            message: "refused".into()
        }
        .is_retryable());
        assert!(ProbeError::HttpStatus {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!ProbeError::InvalidPayload {
            message: "x".into()
        }
        .is_retryable());
        assert!(!ProbeError::Config {
            message: "x".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_status_code_through_request_failed() {
        let err = ProbeError::RequestFailed {
            url: "http://x/esg/DIS".into(),
            attempts: 3,
            last: Box::new(ProbeError::HttpStatus {
                status: 502,
                body: "bad gateway".into(),
            }),
        };
        assert_eq!(err.status_code(), Some(502));
        assert!(err.to_string().contains("3 attempt(s)"));
    }

    #[test]
    fn test_batch_failed_lists_indices() {
        let err = ProbeError::BatchFailed {
            failures: vec![BatchFailure {
                index: 2,
                url: "http://x/price/AAPL".into(),
                error: ProbeError::Transport {
                    message: "reset".into(),
                },
            }],
        };
        let msg = err.to_string();
        assert!(msg.contains("#2"));
        assert!(msg.contains("/price/AAPL"));
    }
}
