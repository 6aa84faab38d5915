//! Timed, retrying HTTP harness for the ESG and stock APIs.
//!
//! This crate provides:
//!
//! - [`timer`]: monotonic measurement of async operations
//! - [`RetryingClient`]: one request with opt-in retry and backoff
//! - [`BatchRunner`]: concurrent requests, order-preserving, timed per request
//! - [`ResultSink`]: append-only measurement log
//! - [`correlate`]: cross-API identifier and date checks
//! - [`scenarios`]: the benchmark and integration suites
//!
//! # Quick Start
//!
//! ```no_run
//! use apiprobe_core::{HarnessConfig, RetryPolicy, RetryingClient, StockApi};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = HarnessConfig::from_env();
//! let client = RetryingClient::new(&config)?;
//! let stock = StockApi::new(config.stock_url.clone());
//!
//! let outcome = client
//!     .execute(&stock.overview("AAPL")?, &config.retry_policy())
//!     .await?;
//! println!("{:.1}ms ({:?})", outcome.elapsed_ms, outcome.status_code);
//!
//! // same call without retry
//! client
//!     .execute(&stock.price("AAPL")?, &RetryPolicy::single_attempt())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `APIPROBE_ESG_URL` | ESG API base URL |
//! | `APIPROBE_STOCK_URL` | Stock API base URL |
//! | `APIPROBE_RESULTS` | Measurement log path (default: `test-results.txt`) |
//! | `APIPROBE_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `APIPROBE_MAX_ATTEMPTS` | Attempts per request when retry is enabled (default: 3) |
//! | `APIPROBE_BACKOFF_MS` | Linear backoff step (default: 1000) |
//! | `APIPROBE_PHASE_DELAY_MS` | Pause between scenarios (default: 1000) |
//! | `APIPROBE_SYMBOL` | Stock suite symbol (default: `AAPL`) |

pub mod apis;
pub mod backoff;
pub mod batch;
pub mod client;
pub mod config;
pub mod correlate;
pub mod error;
pub mod request;
pub mod scenarios;
pub mod sink;
pub mod stats;
pub mod timer;

// Re-export main types
pub use apis::{EsgApi, StockApi};
pub use backoff::{BackoffPolicy, RetryPolicy};
pub use batch::{BatchResult, BatchRunner, FailurePolicy};
pub use client::{RetryingClient, PROBE_USER_AGENT};
pub use config::HarnessConfig;
pub use correlate::{
    check_date_correlation, check_identifier_consistency, extract_dates,
    extract_dates_from_payload, find_record_by_date, match_case_insensitive_contains,
    match_exact, CorrelationCheck, KeyMatch,
};
pub use error::{BatchFailure, ProbeError, ProbeResult};
pub use request::{EndpointTemplate, HttpMethod, Outcome, RequestSpec};
pub use scenarios::{ScenarioContext, Suite, SuiteReport};
pub use sink::{MeasurementRecord, RecordStatus, ResultSink};
pub use stats::LatencySummary;
pub use timer::{measure, Stopwatch, Timed};
