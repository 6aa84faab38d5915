//! ESG API suite: endpoint latency, a concurrent batch, and consistency
//! between the ESG search endpoints. Requests are not retried.

use anyhow::{bail, ensure, Context};
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use super::{Scenario, ScenarioContext, ScenarioPass};
use crate::apis::{CompanyHit, CompanySearch, EsgRecord, NotFoundBody, ScoreSearch, StockOverview};
use crate::backoff::RetryPolicy;
use crate::correlate::{contains_matching_record, match_exact};
use crate::request::{Outcome, RequestSpec};
use crate::sink::RecordStatus;

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "Get all ESG data",
        run: get_all,
    },
    Scenario {
        name: "Get Disney ESG data",
        run: get_disney,
    },
    Scenario {
        name: "Search by total score range",
        run: search_score_range,
    },
    Scenario {
        name: "Search by total level",
        run: search_level,
    },
    Scenario {
        name: "Search by company name",
        run: search_company,
    },
    Scenario {
        name: "Concurrent requests",
        run: concurrent,
    },
    Scenario {
        name: "Integration: Finding ticker from company search",
        run: ticker_from_company_search,
    },
    Scenario {
        name: "Integration: Checking relationship between score and rating",
        run: rating_matches_score_range,
    },
    Scenario {
        name: "E2E: User searching for ESG data without knowing ticker",
        run: search_without_ticker,
    },
    Scenario {
        name: "E2E: User searching for current stock price of a company",
        run: current_stock_price,
    },
];

/// Rating `C` corresponds to total scores 20..=30.
pub const RATING_C_RANGE: (&str, u32, u32) = ("C", 20, 30);

async fn fetch(ctx: &ScenarioContext, spec: RequestSpec) -> anyhow::Result<Outcome> {
    Ok(ctx
        .client()
        .execute(&spec, &RetryPolicy::single_attempt())
        .await?)
}

fn first_company(outcome: &Outcome) -> anyhow::Result<CompanyHit> {
    let search: CompanySearch = outcome
        .payload_as()
        .context("company search response")?;
    search
        .companies
        .into_iter()
        .next()
        .context("company search returned no companies")
}

fn get_all(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let outcome = fetch(ctx, ctx.esg().all()?).await?;
        Ok(ScenarioPass::of(&outcome))
    })
}

fn get_disney(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let outcome = fetch(ctx, ctx.esg().esg("DIS")?).await?;
        Ok(ScenarioPass::of(&outcome))
    })
}

fn search_score_range(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let outcome = fetch(ctx, ctx.esg().search_score("total_score", 0, 10)?).await?;
        Ok(ScenarioPass::of(&outcome))
    })
}

fn search_level(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let outcome = fetch(ctx, ctx.esg().search_level("total_level", "A")?).await?;
        Ok(ScenarioPass::of(&outcome))
    })
}

fn search_company(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let outcome = fetch(ctx, ctx.esg().search_company("mcdonald")?).await?;
        Ok(ScenarioPass::of(&outcome))
    })
}

fn concurrent(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let esg = ctx.esg();
        let specs = vec![
            esg.all()?,
            esg.esg("DIS")?,
            esg.search_score("total_score", 0, 10)?,
            esg.search_level("total_level", "A")?,
            esg.search_company("mcdonald")?,
        ];
        let result = ctx
            .batch(RetryPolicy::single_attempt())
            .run_all(&specs)
            .await?;
        let avg = result.average_elapsed_ms.unwrap_or_default();
        Ok(ScenarioPass {
            elapsed_ms: Some(result.total_elapsed_ms),
            status: RecordStatus::Text(format!("Avg: {avg:.2}ms")),
            checks: Vec::new(),
        })
    })
}

fn ticker_from_company_search(
    ctx: &ScenarioContext,
) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let search = fetch(ctx, ctx.esg().search_company("disney")?).await?;
        let company = first_company(&search)?;
        ensure!(
            company.company_name == "The Walt Disney Company",
            "expected The Walt Disney Company, got {:?}",
            company.company_name
        );

        let detail = fetch(ctx, ctx.esg().esg(&company.ticker)?).await?;
        ensure!(
            detail.payload.as_ref().is_some_and(Value::is_object),
            "ESG detail for {} is not an object",
            company.ticker
        );
        Ok(ScenarioPass::timed_by_runner(detail.status_code.unwrap_or(200)))
    })
}

fn rating_matches_score_range(
    ctx: &ScenarioContext,
) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let (rating, min, max) = RATING_C_RANGE;

        let by_level = fetch(ctx, ctx.esg().search_level("total_level", rating)?).await?;
        let company = first_company(&by_level).context("level search")?;

        let score = company
            .total_score
            .context("company has no numeric total_score")?;
        ensure!(
            score >= f64::from(min) && score <= f64::from(max),
            "rating {rating} company has score {score}, outside [{min}, {max}]"
        );
        let timestamp = company
            .timestamp
            .clone()
            .context("company has no timestamp")?;

        let mut expected = Map::new();
        expected.insert("ticker".into(), Value::from(company.ticker.as_str()));
        expected.insert("company_name".into(), Value::from(company.company_name.as_str()));
        expected.insert("total_score".into(), Value::from(score));
        expected.insert("timestamp".into(), timestamp);

        let by_score = fetch(ctx, ctx.esg().search_score("total_score", min, max)?).await?;
        let search: ScoreSearch = by_score
            .payload_as()
            .context("score search response")?;
        ensure!(
            contains_matching_record(&search.valid_companies, &expected),
            "{} not found in score range [{min}, {max}]",
            company.ticker
        );

        Ok(ScenarioPass::timed_by_runner(by_score.status_code.unwrap_or(200)))
    })
}

fn search_without_ticker(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let by_name = fetch(ctx, ctx.esg().search_company("mcdonald")?).await?;
        let ticker = first_company(&by_name)?.ticker;
        ensure!(match_exact(&ticker, "mcd"), "mcdonald resolved to {ticker:?}");

        // unknown alias: the 404 is the expected answer
        let alias = ctx
            .client()
            .execute_once(&ctx.esg().search_company("maccas")?)
            .await?;
        ensure!(
            alias.status_code == Some(404),
            "maccas lookup returned {:?}, expected 404",
            alias.status_code
        );
        let body: NotFoundBody = alias.payload_as().context("maccas 404 body")?;
        ensure!(
            body.message == "Company not found",
            "unexpected not-found message {:?}",
            body.message
        );

        let by_symbol = fetch(ctx, ctx.esg().search_company("MCD")?).await?;
        let ticker = first_company(&by_symbol)?.ticker;
        ensure!(match_exact(&ticker, "mcd"), "MCD resolved to {ticker:?}");

        Ok(ScenarioPass::timed_by_runner(by_symbol.status_code.unwrap_or(200)))
    })
}

fn current_stock_price(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let search = fetch(ctx, ctx.esg().search_company("disney")?).await?;
        let ticker = first_company(&search)?.ticker;
        ensure!(match_exact(&ticker, "dis"), "disney resolved to {ticker:?}");

        let detail = fetch(ctx, ctx.esg().esg(&ticker)?).await?;
        let record: EsgRecord = detail.payload_as().context("ESG detail")?;
        ensure!(
            record.ticker.eq_ignore_ascii_case(&ticker),
            "ESG detail for {ticker} describes {:?}",
            record.ticker
        );

        let overview = fetch(ctx, ctx.stock().overview(&ticker)?).await?;
        let view: StockOverview = overview.payload_as().context("stock overview")?;
        match view.current_price {
            Some(price) if price.is_finite() && price > 0.0 => {}
            other => bail!("overview for {ticker} has no usable currentPrice ({other:?})"),
        }

        Ok(ScenarioPass::timed_by_runner(overview.status_code.unwrap_or(200)))
    })
}
