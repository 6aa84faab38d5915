use anyhow::Context;
use apiprobe_core::scenarios::{run_suite, run_suites, ScenarioStatus, SuiteReport};
use apiprobe_core::{HarnessConfig, ScenarioContext};
use tracing::info;

use super::super::args::{OutputFormat, RunArgs};
use crate::exit_codes::{EXIT_CONFIG_ERROR, EXIT_SUCCESS, EXIT_TEST_FAILURE};

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let config = args.apply(HarnessConfig::from_env());
    let results_path = config.results_path.clone();

    let ctx = match ScenarioContext::new(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Config error: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    info!(
        esg_url = ctx.esg().base_url(),
        stock_url = ctx.stock().base_url(),
        results = %results_path.display(),
        "starting run"
    );

    let suites = args.suite.suites();
    let filter = args.filter.as_deref();
    let outcome = match suites.as_slice() {
        [suite] => run_suite(&ctx, *suite, filter).await,
        _ => run_suites(&ctx, &suites, filter).await,
    };
    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Results error: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    match args.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        eprintln!("Report saved to {}", path.display());
    }
    eprintln!("Measurements written to {}", results_path.display());

    Ok(if report.all_passed() {
        EXIT_SUCCESS
    } else {
        EXIT_TEST_FAILURE
    })
}

fn print_text(report: &SuiteReport) {
    println!(
        "{:<62} {:<8} {:>12} {:<6}",
        "SCENARIO", "STATUS", "ELAPSED(ms)", "HTTP"
    );
    println!("{:-<62} {:-<8} {:->12} {:-<6}", "", "", "", "");

    for res in &report.results {
        let status = match res.status {
            ScenarioStatus::Passed => "PASSED",
            ScenarioStatus::Failed => "FAILED",
        };
        let code = res
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<62} {:<8} {:>12.3} {:<6}",
            res.name, status, res.elapsed_ms, code
        );
        if let Some(message) = &res.message {
            println!("    {message}");
        }
        for check in res.checks.iter().filter(|c| !c.holds) {
            println!(
                "    mismatch [{}]: {}",
                check.shared_key,
                check.explanation.as_deref().unwrap_or("does not hold")
            );
        }
    }

    println!();
    println!(
        "SUMMARY ({}): total={} passed={} failed={} mismatches={}",
        report.suite,
        report.summary.total,
        report.summary.passed,
        report.summary.failed,
        report.summary.mismatches
    );
}
