//! Benchmark and cross-API scenarios.
//!
//! A scenario is a plain async function over a shared [`ScenarioContext`].
//! It returns what should be written to the measurement log; the runner
//! does the timing, the logging and the bookkeeping.

use std::fmt;
use std::str::FromStr;

use futures::future::BoxFuture;
use serde::Serialize;

use crate::apis::{EsgApi, StockApi};
use crate::backoff::RetryPolicy;
use crate::batch::BatchRunner;
use crate::client::RetryingClient;
use crate::config::HarnessConfig;
use crate::correlate::CorrelationCheck;
use crate::error::{ProbeError, ProbeResult};
use crate::request::Outcome;
use crate::sink::{MeasurementRecord, RecordStatus, ResultSink};

pub mod esg;
pub mod integration;
mod report;
mod runner;
pub mod stock;

pub use report::{ScenarioResult, ScenarioStatus, SuiteReport, SuiteSummary};
pub use runner::{run_scenario, run_suite, run_suites};

/// Group of scenarios run together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// ESG API latency plus ESG-internal consistency (single attempt).
    Esg,
    /// Stock API latency (retry enabled).
    Stock,
    /// Cross-checks between the ESG and stock APIs.
    Integration,
}

impl Suite {
    pub const ALL: [Suite; 3] = [Suite::Esg, Suite::Stock, Suite::Integration];

    pub fn name(self) -> &'static str {
        match self {
            Self::Esg => "esg",
            Self::Stock => "stock",
            Self::Integration => "integration",
        }
    }

    pub fn scenarios(self) -> &'static [Scenario] {
        match self {
            Self::Esg => esg::SCENARIOS,
            Self::Stock => stock::SCENARIOS,
            Self::Integration => integration::SCENARIOS,
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Suite {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suite::ALL
            .into_iter()
            .find(|suite| suite.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProbeError::Config {
                message: format!("unknown suite '{s}' (expected esg, stock or integration)"),
            })
    }
}

pub type ScenarioFn =
    for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, anyhow::Result<ScenarioPass>>;

/// A named scenario.
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Label written to the measurement log.
    pub name: &'static str,
    pub run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

/// What a passing scenario reports.
#[derive(Debug, Clone)]
pub struct ScenarioPass {
    /// Time to log; `None` logs the scenario's own wall time.
    pub elapsed_ms: Option<f64>,
    pub status: RecordStatus,
    pub checks: Vec<CorrelationCheck>,
}

impl ScenarioPass {
    /// Latency and status of a single request.
    pub fn of(outcome: &Outcome) -> Self {
        Self {
            elapsed_ms: Some(outcome.elapsed_ms),
            status: outcome
                .status_code
                .map(RecordStatus::Code)
                .unwrap_or_else(|| RecordStatus::from("no status")),
            checks: Vec::new(),
        }
    }

    /// Scenario wall time with the given status.
    pub fn timed_by_runner(status: impl Into<RecordStatus>) -> Self {
        Self {
            elapsed_ms: None,
            status: status.into(),
            checks: Vec::new(),
        }
    }

    pub fn with_checks(mut self, checks: Vec<CorrelationCheck>) -> Self {
        self.checks = checks;
        self
    }
}

/// Everything a scenario may use. Built once per run.
#[derive(Debug)]
pub struct ScenarioContext {
    config: HarnessConfig,
    client: RetryingClient,
    esg: EsgApi,
    stock: StockApi,
    sink: ResultSink,
}

impl ScenarioContext {
    /// Validate `config`, build the client and truncate the measurement log.
    pub async fn new(config: HarnessConfig) -> ProbeResult<Self> {
        config.validate()?;
        let client = RetryingClient::new(&config)?;
        let sink = ResultSink::create(&config.results_path).await?;
        Ok(Self {
            esg: EsgApi::new(config.esg_url.clone()),
            stock: StockApi::new(config.stock_url.clone()),
            config,
            client,
            sink,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn client(&self) -> &RetryingClient {
        &self.client
    }

    pub fn esg(&self) -> &EsgApi {
        &self.esg
    }

    pub fn stock(&self) -> &StockApi {
        &self.stock
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Batch runner sharing this context's connection pool.
    pub fn batch(&self, retry: RetryPolicy) -> BatchRunner {
        BatchRunner::new(self.client.clone(), retry)
    }

    /// Append an extra line to the measurement log.
    pub async fn record(
        &self,
        label: impl Into<String>,
        elapsed_ms: f64,
        status: impl Into<RecordStatus>,
    ) -> ProbeResult<()> {
        self.sink
            .append(&MeasurementRecord::new(label, elapsed_ms, status))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_from_str() {
        assert_eq!("ESG".parse::<Suite>().unwrap(), Suite::Esg);
        assert_eq!("integration".parse::<Suite>().unwrap(), Suite::Integration);
        assert!("crypto".parse::<Suite>().is_err());
    }

    #[test]
    fn test_scenario_names_unique_per_suite() {
        for suite in Suite::ALL {
            let mut names: Vec<&str> = suite.scenarios().iter().map(|s| s.name).collect();
            let len = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), len, "duplicate scenario name in {suite}");
            assert!(len > 0);
        }
    }
}
