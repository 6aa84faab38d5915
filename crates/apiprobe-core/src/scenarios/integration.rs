//! Cross-checks between the stock API and the ESG API.

use anyhow::{bail, Context};
use futures::future::BoxFuture;

use super::{Scenario, ScenarioContext, ScenarioPass};
use crate::apis::esg::DATE_FIELDS;
use crate::backoff::RetryPolicy;
use crate::correlate::{
    check_date_correlation, check_identifier_consistency, extract_dates, field,
    match_case_insensitive_contains, KeyMatch,
};
use crate::error::ProbeResult;
use crate::request::{Outcome, RequestSpec};

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "Disney ticker is consistent across APIs",
        run: disney_ticker_consistent,
    },
    Scenario {
        name: "Common companies exist in both APIs",
        run: common_companies,
    },
    Scenario {
        name: "ESG-Price correlation test",
        run: esg_dates_have_prices,
    },
];

const DISNEY: &str = "DIS";

/// Symbols listed by both APIs.
pub const COMMON_COMPANIES: &[&str] = &["AAPL", "MSFT", "GOOGL"];

/// Dates looked up per correlation run; the history endpoint is slow.
pub const MAX_DATES_CHECKED: usize = 3;

async fn fetch(ctx: &ScenarioContext, spec: ProbeResult<RequestSpec>) -> ProbeResult<Outcome> {
    ctx.client()
        .execute(&spec?, &RetryPolicy::single_attempt())
        .await
}

fn disney_ticker_consistent(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let overview = fetch(ctx, ctx.stock().overview(DISNEY)).await;
        let esg = fetch(ctx, ctx.esg().esg(DISNEY)).await;

        let ticker = check_identifier_consistency(
            DISNEY,
            &overview,
            &esg,
            field("symbol"),
            field("ticker"),
            KeyMatch::Exact,
        );
        if !ticker.holds {
            bail!(
                "ticker mismatch: {}",
                ticker.explanation.as_deref().unwrap_or("unknown")
            );
        }
        // agreeing on the wrong symbol is still a mismatch
        if ticker.source_a.as_deref() != Some(DISNEY) {
            bail!(
                "ticker mismatch: both APIs returned {:?}, expected {DISNEY:?}",
                ticker.source_a.as_deref().unwrap_or_default()
            );
        }

        let name = overview?
            .payload()?
            .get("name")
            .and_then(|n| n.as_str())
            .map(String::from)
            .context("stock overview has no name")?;
        if !match_case_insensitive_contains("disney", &name) {
            bail!("stock overview name {name:?} does not mention disney");
        }

        Ok(ScenarioPass::timed_by_runner(200u16).with_checks(vec![ticker]))
    })
}

fn common_companies(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let mut checks = Vec::with_capacity(COMMON_COMPANIES.len());
        let mut missing = Vec::new();

        for &symbol in COMMON_COMPANIES {
            let overview = fetch(ctx, ctx.stock().overview(symbol)).await;
            let esg = fetch(ctx, ctx.esg().esg(symbol)).await;

            let expected = symbol.to_string();
            let check = check_identifier_consistency(
                symbol,
                &overview,
                &esg,
                field("symbol"),
                field("ticker"),
                KeyMatch::Exact,
            );
            // both sides must also echo the symbol that was asked for
            let holds = check.holds && check.source_a.as_deref() == Some(expected.as_str());

            let elapsed = [overview.as_ref().ok(), esg.as_ref().ok()]
                .into_iter()
                .flatten()
                .map(|o| o.elapsed_ms)
                .sum::<f64>();
            let status = if holds {
                "PASSED (200)".to_string()
            } else {
                format!(
                    "FAILED: {}",
                    check.explanation.as_deref().unwrap_or("symbol mismatch")
                )
            };
            ctx.record(format!("Company {symbol} exists in both APIs"), elapsed, status)
                .await?;

            if !holds {
                missing.push(symbol);
            }
            checks.push(check);
        }

        if !missing.is_empty() {
            bail!("not consistent in both APIs: {}", missing.join(", "));
        }
        Ok(ScenarioPass::timed_by_runner(200u16).with_checks(checks))
    })
}

/// Dates found in Disney's ESG record are looked up in Disney's price
/// history. Missing prices are reported, not failed: the history endpoint
/// only answers for trading days.
fn esg_dates_have_prices(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let esg = fetch(ctx, ctx.esg().esg(DISNEY)).await?;
        let extraction = extract_dates(esg.payload()?, DATE_FIELDS);

        if extraction.dates.is_empty() {
            ctx.record("Extracted ESG dates for Disney", esg.elapsed_ms, "no dates found")
                .await?;
            return Ok(ScenarioPass::timed_by_runner("Completed"));
        }

        let to_check: Vec<&str> = extraction
            .dates
            .iter()
            .take(MAX_DATES_CHECKED)
            .map(String::as_str)
            .collect();
        ctx.record(
            "Extracted ESG dates for Disney",
            esg.elapsed_ms,
            format!(
                "{} dates found ({:?}), querying stock API for: {}",
                extraction.dates.len(),
                extraction.source,
                to_check.join(", ")
            ),
        )
        .await?;

        // one history response serves every date
        let history = fetch(ctx, ctx.stock().historical(DISNEY)).await;
        let history_ms = history.as_ref().map(|o| o.elapsed_ms).unwrap_or_default();

        let mut checks = Vec::with_capacity(to_check.len());
        for date in to_check {
            let check = check_date_correlation(date, &history);
            let status = match (&check.source_b, check.holds) {
                (Some(close), true) => format!("Found: ${close}"),
                (None, true) => "Found: no close price".to_string(),
                (_, false) => check
                    .explanation
                    .clone()
                    .unwrap_or_else(|| "Price not found for this date".to_string()),
            };
            ctx.record(format!("Disney price for {date}"), history_ms, status)
                .await?;
            checks.push(check);
        }

        Ok(ScenarioPass::timed_by_runner("Completed").with_checks(checks))
    })
}
