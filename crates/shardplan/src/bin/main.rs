use anyhow::Result;
use clap::{Parser, ValueEnum};
use shardplan::commands::Commands;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LoggingMode {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl From<LoggingMode> for logutil::LoggingMode {
    fn from(mode: LoggingMode) -> Self {
        match mode {
            LoggingMode::Pretty => logutil::LoggingMode::Pretty,
            LoggingMode::Json => logutil::LoggingMode::Json,
            LoggingMode::Compact => logutil::LoggingMode::Compact,
        }
    }
}

#[derive(Parser)]
#[clap(name = "shardplan")]
#[clap(version)]
#[clap(about = "Plan distributed group by queries", long_about = None)]
struct Cli {
    /// Log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Format of log lines written to stderr.
    #[clap(long, value_enum, global = true)]
    log_mode: Option<LoggingMode>,

    #[clap(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logutil::init(cli.verbose, cli.log_mode.unwrap_or_default().into());
    info!(version = env!("CARGO_PKG_VERSION"), "starting...");

    cli.command.run()
}
