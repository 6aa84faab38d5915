//! Concurrent batches of requests.
//!
//! All requests of a batch are in flight at once on the calling task; no
//! task is spawned. Each request is timed on its own, so per-request
//! latency never depends on how long its siblings took.

use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, info};

use crate::backoff::RetryPolicy;
use crate::client::RetryingClient;
use crate::error::{BatchFailure, ProbeError, ProbeResult};
use crate::request::{Outcome, RequestSpec};
use crate::stats::{mean, LatencySummary};
use crate::timer::Stopwatch;

/// What to do when one request of a batch fails after its retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the join on the first failure; in-flight siblings are dropped.
    #[default]
    FailFast,
    /// Wait for every request, then report all failures together.
    FailLate,
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub outcomes: Vec<Outcome>,
    /// From issuing the first request to completion of the last.
    pub total_elapsed_ms: f64,
    /// Mean of the per-outcome elapsed times; `None` for an empty batch.
    pub average_elapsed_ms: Option<f64>,
    pub latency: Option<LatencySummary>,
}

impl BatchResult {
    fn from_outcomes(outcomes: Vec<Outcome>, total_elapsed_ms: f64) -> Self {
        let samples: Vec<f64> = outcomes.iter().map(|o| o.elapsed_ms).collect();
        Self {
            average_elapsed_ms: mean(&samples),
            latency: LatencySummary::from_samples(&samples),
            outcomes,
            total_elapsed_ms,
        }
    }
}

/// Runs independent requests concurrently through a [`RetryingClient`].
#[derive(Debug, Clone)]
pub struct BatchRunner {
    client: RetryingClient,
    retry: RetryPolicy,
    failure_policy: FailurePolicy,
}

impl BatchRunner {
    pub fn new(client: RetryingClient, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub async fn run_all(&self, specs: &[RequestSpec]) -> ProbeResult<BatchResult> {
        debug!(
            requests = specs.len(),
            policy = ?self.failure_policy,
            "issuing batch"
        );

        let stopwatch = Stopwatch::start();
        let requests = specs.iter().enumerate().map(|(index, spec)| async move {
            self.client
                .execute(spec, &self.retry)
                .await
                .map_err(|error| BatchFailure {
                    index,
                    url: spec.url().to_string(),
                    error,
                })
        });

        let outcomes = match self.failure_policy {
            FailurePolicy::FailFast => try_join_all(requests)
                .await
                .map_err(|failure| ProbeError::BatchFailed {
                    failures: vec![failure],
                })?,
            FailurePolicy::FailLate => {
                let mut outcomes = Vec::with_capacity(specs.len());
                let mut failures = Vec::new();
                for result in join_all(requests).await {
                    match result {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(failure) => failures.push(failure),
                    }
                }
                if !failures.is_empty() {
                    return Err(ProbeError::BatchFailed { failures });
                }
                outcomes
            }
        };

        let result = BatchResult::from_outcomes(outcomes, stopwatch.elapsed_ms());
        info!(
            requests = result.outcomes.len(),
            total_ms = result.total_elapsed_ms,
            avg_ms = result.average_elapsed_ms.unwrap_or_default(),
            "batch completed"
        );
        Ok(result)
    }
}
