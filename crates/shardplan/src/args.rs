use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// Path to a JSON planning request.
    ///
    /// The request holds the cluster view, the analyzed relation and
    /// optionally the relation's position and planner settings.
    #[clap(value_parser)]
    pub request: PathBuf,

    /// Row limit for root relations without a LIMIT.
    ///
    /// Overrides the setting from the request.
    #[clap(long, env = "SHARDPLAN_DEFAULT_SELECT_LIMIT")]
    pub default_select_limit: Option<u64>,

    /// Check column bookkeeping of the plan before printing it.
    #[clap(long)]
    pub verify: bool,

    #[clap(flatten)]
    pub output: OutputOpts,
}

#[derive(Debug, Parser)]
pub struct InsertArgs {
    /// Path to a JSON insert request.
    #[clap(value_parser)]
    pub request: PathBuf,

    #[clap(flatten)]
    pub output: OutputOpts,
}

#[derive(Debug, Clone, Parser)]
pub struct OutputOpts {
    /// Indent the JSON output.
    #[clap(long)]
    pub pretty: bool,
}
