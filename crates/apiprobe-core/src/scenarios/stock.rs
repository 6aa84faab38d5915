//! Stock API suite: endpoint latency with retry enabled.

use futures::future::BoxFuture;

use super::{Scenario, ScenarioContext, ScenarioPass};
use crate::request::RequestSpec;
use crate::sink::RecordStatus;

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "Overview endpoint",
        run: overview,
    },
    Scenario {
        name: "Price endpoint",
        run: price,
    },
    Scenario {
        name: "Options endpoint",
        run: options,
    },
    Scenario {
        name: "Fundamentals endpoint",
        run: fundamentals,
    },
    Scenario {
        name: "Historical data endpoint",
        run: historical,
    },
    Scenario {
        name: "Earnings endpoint",
        run: earnings,
    },
    Scenario {
        name: "Concurrent requests (stock)",
        run: concurrent,
    },
];

const EARNINGS_QUARTERS: u32 = 4;

async fn timed_request(ctx: &ScenarioContext, spec: RequestSpec) -> anyhow::Result<ScenarioPass> {
    let outcome = ctx
        .client()
        .execute(&spec, &ctx.config().retry_policy())
        .await?;
    Ok(ScenarioPass::of(&outcome))
}

fn symbol(ctx: &ScenarioContext) -> &str {
    &ctx.config().stock_symbol
}

fn overview(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move { timed_request(ctx, ctx.stock().overview(symbol(ctx))?).await })
}

fn price(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move { timed_request(ctx, ctx.stock().price(symbol(ctx))?).await })
}

fn options(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move { timed_request(ctx, ctx.stock().options(symbol(ctx))?).await })
}

fn fundamentals(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move { timed_request(ctx, ctx.stock().fundamentals(symbol(ctx))?).await })
}

fn historical(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move { timed_request(ctx, ctx.stock().historical(symbol(ctx))?).await })
}

fn earnings(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        timed_request(ctx, ctx.stock().earnings(symbol(ctx), EARNINGS_QUARTERS)?).await
    })
}

fn concurrent(ctx: &ScenarioContext) -> BoxFuture<'_, anyhow::Result<ScenarioPass>> {
    Box::pin(async move {
        let stock = ctx.stock();
        let symbol = symbol(ctx);
        let specs = vec![
            stock.overview(symbol)?,
            stock.price(symbol)?,
            stock.fundamentals(symbol)?,
        ];
        let result = ctx
            .batch(ctx.config().retry_policy())
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
