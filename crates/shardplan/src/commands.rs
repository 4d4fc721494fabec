use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shardplan_core::analyze::insert::InsertFromSubqueryAnalyzer;
use shardplan_core::catalog::MemoryCatalog;
use shardplan_core::config::{DefaultSelectLimit, PlannerConfig, PlannerSetting};
use shardplan_core::functions::Functions;
use shardplan_core::planner::consumer::ConsumingPlanner;
use shardplan_core::planner::context::{PlannerContext, RelationPosition};
use shardplan_core::planner::node::ExecutionNodeIdGen;
use tracing::{debug, info};

use crate::args::{InsertArgs, OutputOpts, PlanArgs};
use crate::request::{InsertRequest, PlanRequest};

#[derive(Subcommand)]
pub enum Commands {
    /// Plan an analyzed relation and print the plan.
    Plan(PlanArgs),
    /// Reconcile subquery outputs with the columns of an insert target.
    Insert(InsertArgs),
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Plan(plan) => plan.run(),
            Commands::Insert(insert) => insert.run(),
        }
    }
}

trait RunCommand {
    fn run(self) -> Result<()>;
}

impl RunCommand for PlanArgs {
    fn run(self) -> Result<()> {
        let request: PlanRequest = read_request(&self.request)?;

        let mut config = PlannerConfig::default();
        for (name, value) in request.settings {
            config.set_from_scalar(&name, value)?;
        }
        if let Some(limit) = self.default_select_limit {
            config.set_from_scalar(DefaultSelectLimit::NAME, limit.into())?;
        }
        if self.verify {
            config.verify_plans = true;
        }

        let context = PlannerContext::new(request.cluster, config);
        info!(job_id = %context.job_id(), relation = %request.relation, position = ?request.position, "planning relation");

        let planner = ConsumingPlanner::new();
        let plan = match request.position {
            RelationPosition::Root => planner.plan(&request.relation, &context)?,
            RelationPosition::Nested => {
                let mut id_gen = ExecutionNodeIdGen::new();
                planner.plan_nested(&request.relation, &context, &mut id_gen)?
            }
        };

        write_json(&plan, &self.output)
    }
}

impl RunCommand for InsertArgs {
    fn run(self) -> Result<()> {
        let request: InsertRequest = read_request(&self.request)?;

        let table = request.table.ident.clone();
        let mut catalog = MemoryCatalog::new();
        catalog.add_table(request.table);

        let functions = Functions::builtin();
        let analysis = InsertFromSubqueryAnalyzer::new(&functions).analyze(
            &catalog,
            &table,
            &request.columns,
            request.outputs,
        )?;
        info!(%table, columns = analysis.columns.len(), "reconciled insert");

        write_json(&analysis.subquery_outputs, &self.output)
    }
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!(path = %path.display(), "reading request");
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read request '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid request '{}'", path.display()))
}

fn write_json(value: &impl Serialize, opts: &OutputOpts) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if opts.pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
