use serde::Serialize;

use crate::correlate::CorrelationCheck;

#[derive(Debug, Serialize, Clone)]
pub struct SuiteReport {
    pub suite: String,
    pub summary: SuiteSummary,
    pub results: Vec<ScenarioResult>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Correlation checks that did not hold, across all scenarios.
    pub mismatches: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CorrelationCheck>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioStatus {
    Passed,
    Failed,
}

impl SuiteReport {
    pub fn new(suite: &str) -> Self {
        Self {
            suite: suite.to_string(),
            summary: SuiteSummary::default(),
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: ScenarioResult) {
        self.summary.total += 1;
        match result.status {
            ScenarioStatus::Passed => self.summary.passed += 1,
            ScenarioStatus::Failed => self.summary.failed += 1,
        }
        self.summary.mismatches += result.checks.iter().filter(|c| !c.holds).count();
        self.results.push(result);
    }

    /// Fold another report into this one (used for `all`).
    pub fn merge(&mut self, other: SuiteReport) {
        for result in other.results {
            self.add_result(result);
        }
    }

    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }
}
