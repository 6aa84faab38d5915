//! `run` command arguments.

use std::path::PathBuf;

use apiprobe_core::{HarnessConfig, Suite};
use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuiteArg {
    Esg,
    Stock,
    Integration,
    #[default]
    All,
}

impl SuiteArg {
    pub fn suites(self) -> Vec<Suite> {
        match self {
            Self::Esg => vec![Suite::Esg],
            Self::Stock => vec![Suite::Stock],
            Self::Integration => vec![Suite::Integration],
            Self::All => Suite::ALL.to_vec(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Suite to run
    #[arg(long, value_enum, default_value_t = SuiteArg::All)]
    pub suite: SuiteArg,

    /// Only run scenarios whose name contains this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,

    /// Measurement log, truncated at start
    #[arg(long, env = "APIPROBE_RESULTS")]
    pub results: Option<PathBuf>,

    #[arg(long, env = "APIPROBE_ESG_URL")]
    pub esg_url: Option<String>,

    #[arg(long, env = "APIPROBE_STOCK_URL")]
    pub stock_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "APIPROBE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Attempts per request for the stock suite
    #[arg(long, env = "APIPROBE_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Linear backoff step between attempts
    #[arg(long, env = "APIPROBE_BACKOFF_MS")]
    pub backoff_ms: Option<u64>,

    /// Pause between scenarios (rate limiting)
    #[arg(long, env = "APIPROBE_PHASE_DELAY_MS")]
    pub phase_delay_ms: Option<u64>,

    /// Symbol for the stock suite
    #[arg(long, env = "APIPROBE_SYMBOL")]
    pub symbol: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay the flags that were given on `base`.
    pub fn apply(&self, mut base: HarnessConfig) -> HarnessConfig {
        if let Some(path) = &self.results {
            base.results_path = path.clone();
        }
        if let Some(url) = &self.esg_url {
            base.esg_url = url.clone();
        }
        if let Some(url) = &self.stock_url {
            base.stock_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            base.timeout_secs = secs;
        }
        if let Some(n) = self.max_attempts {
            base.max_attempts = n;
        }
        if let Some(ms) = self.backoff_ms {
            base.backoff_base_ms = ms;
        }
        if let Some(ms) = self.phase_delay_ms {
            base.phase_delay_ms = ms;
        }
        if let Some(symbol) = &self.symbol {
            base.stock_symbol = symbol.clone();
        }
        base
    }
}
