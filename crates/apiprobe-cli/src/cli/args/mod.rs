use clap::{Parser, Subcommand};

pub mod run;
pub use run::*;

#[derive(Parser, Debug)]
#[command(
    name = "apiprobe",
    version,
    about = "Latency benchmarks and cross-API consistency checks for the ESG and stock APIs"
)]
pub struct Cli {
    /// Emit log events as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run benchmark and integration scenarios
    Run(RunArgs),
    /// List scenario names per suite
    List,
    /// Print the version
    Version,
}
