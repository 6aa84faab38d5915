//! Harness configuration.
//!
//! One immutable settings value is built at startup and passed to every
//! component; nothing reads the environment after that.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::{BackoffPolicy, RetryPolicy};

/// Harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the ESG API (no trailing slash needed).
    #[serde(default = "default_esg_url")]
    pub esg_url: String,

    /// Base URL of the stock API.
    #[serde(default = "default_stock_url")]
    pub stock_url: String,

    /// Measurement log, truncated at the start of every run.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per request for suites that opt in to retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Pause between scenarios, to stay under upstream rate limits.
    #[serde(default = "default_phase_delay_ms")]
    pub phase_delay_ms: u64,

    /// Symbol used by the stock benchmark suite.
    #[serde(default = "default_stock_symbol")]
    pub stock_symbol: String,
}

fn default_esg_url() -> String {
    "https://gh4vkppgue.execute-api.us-east-1.amazonaws.com/prod/api".to_string()
}

fn default_stock_url() -> String {
    "https://8a38hm2y70.execute-api.ap-southeast-2.amazonaws.com/v1/stocks".to_string()
}

fn default_results_path() -> PathBuf {
    PathBuf::from("test-results.txt")
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_phase_delay_ms() -> u64 {
    1000
}

fn default_stock_symbol() -> String {
    "AAPL".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            esg_url: default_esg_url(),
            stock_url: default_stock_url(),
            results_path: default_results_path(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            phase_delay_ms: default_phase_delay_ms(),
            stock_symbol: default_stock_symbol(),
        }
    }
}

impl HarnessConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `APIPROBE_ESG_URL` | ESG API base URL |
    /// | `APIPROBE_STOCK_URL` | Stock API base URL |
    /// | `APIPROBE_RESULTS` | Measurement log path |
    /// | `APIPROBE_TIMEOUT` | Request timeout in seconds |
    /// | `APIPROBE_MAX_ATTEMPTS` | Attempts per request when retry is enabled |
    /// | `APIPROBE_BACKOFF_MS` | Linear backoff step |
    /// | `APIPROBE_PHASE_DELAY_MS` | Pause between scenarios |
    /// | `APIPROBE_SYMBOL` | Stock suite symbol |
    pub fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.parse().ok())
        }

        Self {
            esg_url: std::env::var("APIPROBE_ESG_URL").unwrap_or_else(|_| default_esg_url()),
            stock_url: std::env::var("APIPROBE_STOCK_URL").unwrap_or_else(|_| default_stock_url()),
            results_path: std::env::var("APIPROBE_RESULTS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_results_path()),
            timeout_secs: parsed("APIPROBE_TIMEOUT").unwrap_or_else(default_timeout),
            max_attempts: parsed("APIPROBE_MAX_ATTEMPTS").unwrap_or_else(default_max_attempts),
            backoff_base_ms: parsed("APIPROBE_BACKOFF_MS").unwrap_or_else(default_backoff_base_ms),
            phase_delay_ms: parsed("APIPROBE_PHASE_DELAY_MS")
                .unwrap_or_else(default_phase_delay_ms),
            stock_symbol: std::env::var("APIPROBE_SYMBOL")
                .unwrap_or_else(|_| default_stock_symbol()),
        }
    }

    pub fn with_esg_url(mut self, url: impl Into<String>) -> Self {
        self.esg_url = url.into();
        self
    }

    pub fn with_stock_url(mut self, url: impl Into<String>) -> Self {
        self.stock_url = url.into();
        self
    }

    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    pub fn with_phase_delay_ms(mut self, ms: u64) -> Self {
        self.phase_delay_ms = ms;
        self
    }

    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }

    /// Retry policy for suites that opt in: `max_attempts` tries with
    /// linear backoff.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            BackoffPolicy::linear(Duration::from_millis(self.backoff_base_ms)),
        )
    }

    /// Reject values the harness cannot run with.
    pub fn validate(&self) -> Result<(), crate::error::ProbeError> {
        if self.max_attempts == 0 {
            return Err(crate::error::ProbeError::Config {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(crate::error::ProbeError::Config {
                message: "timeout_secs must be at least 1".to_string(),
            });
        }
        for (name, url) in [("esg_url", &self.esg_url), ("stock_url", &self.stock_url)] {
            url::Url::parse(url).map_err(|e| crate::error::ProbeError::Config {
                message: format!("{name} is not a valid URL ({url}): {e}"),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.backoff_base_ms, 1000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let cfg = HarnessConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let cfg = HarnessConfig::default().with_esg_url("not a url");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("esg_url"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let cfg: HarnessConfig =
            serde_json::from_str(r#"{"stock_symbol": "MSFT"}"#).unwrap();
        assert_eq!(cfg.stock_symbol, "MSFT");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn test_retry_policy_uses_linear_steps() {
        let cfg = HarnessConfig::default().with_backoff_base_ms(250);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(2), Duration::from_millis(500));
    }
}
