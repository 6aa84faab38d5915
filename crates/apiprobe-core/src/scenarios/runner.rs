use tracing::{info, warn};

use super::report::{ScenarioResult, ScenarioStatus, SuiteReport};
use super::{Scenario, ScenarioContext, Suite};
use crate::error::{ProbeError, ProbeResult};
use crate::sink::RecordStatus;
use crate::timer::measure;

/// Run one scenario and log its measurement, whether it passed or not.
///
/// Only a failing measurement log is an error here; a failing scenario is
/// a `Failed` result.
pub async fn run_scenario(
    ctx: &ScenarioContext,
    scenario: &Scenario,
) -> ProbeResult<ScenarioResult> {
    let timed = measure((scenario.run)(ctx)).await;
    let wall_ms = timed.elapsed_ms();

    match timed.value {
        Ok(pass) => {
            let elapsed_ms = pass.elapsed_ms.unwrap_or(wall_ms);
            ctx.record(scenario.name, elapsed_ms, pass.status.clone()).await?;
            info!(
                scenario = scenario.name,
                elapsed_ms,
                status = %pass.status,
                "scenario passed"
            );
            Ok(ScenarioResult {
                name: scenario.name.to_string(),
                status: ScenarioStatus::Passed,
                elapsed_ms,
                status_code: match pass.status {
                    RecordStatus::Code(code) => Some(code),
                    RecordStatus::Text(_) => None,
                },
                message: None,
                checks: pass.checks,
            })
        }
        Err(err) => {
            let status_code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<ProbeError>())
                .and_then(ProbeError::status_code);
            let message = format!("{err:#}");
            ctx.record(scenario.name, wall_ms, format!("FAILED: {message}"))
                .await?;
            warn!(
                scenario = scenario.name,
                elapsed_ms = wall_ms,
                status_code = ?status_code,
                error = %message,
                "scenario failed"
            );
            Ok(ScenarioResult {
                name: scenario.name.to_string(),
                status: ScenarioStatus::Failed,
                elapsed_ms: wall_ms,
                status_code,
                message: Some(message),
                checks: Vec::new(),
            })
        }
    }
}

/// Run the scenarios of `suite` whose name contains `filter`
/// (case-insensitive).
pub async fn run_suite(
    ctx: &ScenarioContext,
    suite: Suite,
    filter: Option<&str>,
) -> ProbeResult<SuiteReport> {
    run_selected(ctx, suite.name(), &[suite], filter).await
}

/// Run several suites back to back into one report named `all`.
pub async fn run_suites(
    ctx: &ScenarioContext,
    suites: &[Suite],
    filter: Option<&str>,
) -> ProbeResult<SuiteReport> {
    run_selected(ctx, "all", suites, filter).await
}

async fn run_selected(
    ctx: &ScenarioContext,
    report_name: &str,
    suites: &[Suite],
    filter: Option<&str>,
) -> ProbeResult<SuiteReport> {
    let filter = filter.map(str::to_lowercase);
    let selected: Vec<&Scenario> = suites
        .iter()
        .flat_map(|suite| suite.scenarios().iter())
        .filter(|s| {
            filter
                .as_deref()
                .map_or(true, |f| s.name.to_lowercase().contains(f))
        })
        .collect();

    let mut report = SuiteReport::new(report_name);
    let delay = ctx.config().phase_delay();

    for (i, scenario) in selected.into_iter().enumerate() {
        // rate limit pause between phases, not before the first one
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        report.add_result(run_scenario(ctx, scenario).await?);
    }

    Ok(report)
}
