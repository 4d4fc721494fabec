use std::sync::Arc;

use shardplan_core::analyze::insert::InsertFromSubqueryAnalyzer;
use shardplan_core::analyze::query_spec::{HavingClause, OrderBy, OrderByExpr, QuerySpec};
use shardplan_core::analyze::relation::{AnalyzedRelation, QueriedTable};
use shardplan_core::catalog::{MemoryCatalog, NodeId, ShardPlacement, TableInfo, TableResolver};
use shardplan_core::config::PlannerConfig;
use shardplan_core::errors::PlanError;
use shardplan_core::functions::Functions;
use shardplan_core::planner::consumer::ConsumingPlanner;
use shardplan_core::planner::context::{ClusterState, PlannerContext};
use shardplan_core::planner::node::{ExecutionNodeId, ExecutionNodeIdGen};
use shardplan_core::planner::plan::PlannedRelation;
use shardplan_core::planner::projection::Projection;
use shardplan_core::symbol::{ColumnIdent, Function, FunctionIdent, Reference, Symbol, TableIdent};
use shardplan_core::types::DataType;

fn catalog() -> MemoryCatalog {
    let logs = TableIdent::doc("logs");
    let summary = TableIdent::doc("summary");

    let mut catalog = MemoryCatalog::new();
    catalog.add_table(TableInfo {
        ident: logs.clone(),
        columns: vec![
            Reference::new(logs.clone(), ColumnIdent::new("host"), DataType::String),
            Reference::new(logs.clone(), ColumnIdent::new("bytes"), DataType::Integer),
        ],
        shards: (0..6)
            .map(|shard_id| ShardPlacement {
                index: "logs".to_string(),
                shard_id,
                node: NodeId::new(format!("n{}", shard_id % 3)),
            })
            .collect(),
    });
    catalog.add_table(TableInfo {
        ident: summary.clone(),
        columns: vec![
            Reference::new(summary.clone(), ColumnIdent::new("host"), DataType::String),
            Reference::new(summary.clone(), ColumnIdent::new("total"), DataType::Double),
        ],
        shards: Vec::new(),
    });
    catalog
}

fn planner_context() -> PlannerContext {
    PlannerContext::new(
        ClusterState::new(NodeId::new("n0"), [NodeId::new("n1"), NodeId::new("n2")]),
        PlannerConfig {
            verify_plans: true,
            ..Default::default()
        },
    )
}

fn column(table: &TableInfo, name: &str) -> Symbol {
    Symbol::Reference(table.get_column(&ColumnIdent::new(name)).unwrap().clone())
}

fn call(functions: &Functions, name: &str, args: Vec<Symbol>) -> Symbol {
    let types = args.iter().map(|arg| arg.value_type().unwrap()).collect();
    let info = functions.lookup(&FunctionIdent::new(name, types)).unwrap();
    Symbol::Function(Function::new(info, args.into_iter().map(Into::into).collect()))
}

/// `SELECT host, sum(bytes) FROM logs GROUP BY host`
fn bytes_per_host(logs: Arc<TableInfo>, functions: &Functions) -> QueriedTable {
    let host = column(&logs, "host");
    let sum = call(functions, "sum", vec![column(&logs, "bytes")]);
    QueriedTable::new(
        logs,
        QuerySpec {
            group_by: Some(vec![host.clone()]),
            ..QuerySpec::new(vec![host, sum])
        },
    )
}

#[test]
fn plan_root_group_by_with_having_and_order() {
    logutil::init_test();

    let functions = Functions::builtin();
    let logs = catalog().resolve_table(&TableIdent::doc("logs")).unwrap();
    let mut table = bytes_per_host(logs, &functions);

    let sum = table.query_spec.outputs[1].clone();
    let threshold = Symbol::literal(1000_i64, DataType::Long);
    table.query_spec.having = Some(HavingClause::new(call(
        &functions,
        "op_>",
        vec![sum.clone(), threshold],
    )));
    table.query_spec.order_by = Some(OrderBy {
        exprs: vec![OrderByExpr::new(sum, false)],
    });
    table.query_spec.limit = Some(3);

    let plan = ConsumingPlanner::new()
        .plan(&AnalyzedRelation::from(table), &planner_context())
        .unwrap();

    let PlannedRelation::DistributedGroupBy(plan) = plan else {
        panic!("expected distributed group by");
    };

    assert_eq!(3, plan.collect.execution_nodes().len());
    assert_eq!(6, plan.collect.routing.num_shards());

    let kinds: Vec<_> = plan.reduce.projections.iter().map(Projection::kind_name).collect();
    assert_eq!(vec!["group", "filter", "top_n"], kinds);
    assert_eq!(vec![DataType::String, DataType::Long], plan.reduce.output_types());

    let local = plan.local_merge.unwrap();
    assert_eq!(ExecutionNodeId(2), local.id);
    assert_eq!(vec![DataType::String, DataType::Long], local.output_types());
}

#[test]
fn insert_from_grouped_subquery() {
    logutil::init_test();

    let functions = Functions::builtin();
    let catalog = catalog();
    let logs = catalog.resolve_table(&TableIdent::doc("logs")).unwrap();
    let subquery = bytes_per_host(logs, &functions);

    // The insert plans its source relation as a nested relation.
    let mut id_gen = ExecutionNodeIdGen::new();
    let source_plan = ConsumingPlanner::new()
        .plan_nested(
            &AnalyzedRelation::from(subquery.clone()),
            &planner_context(),
            &mut id_gen,
        )
        .unwrap();
    let PlannedRelation::DistributedGroupBy(source_plan) = source_plan else {
        panic!("expected distributed group by");
    };
    assert!(source_plan.local_merge.is_none());
    let downstream = source_plan.reduce.downstream.as_ref().unwrap();
    assert_eq!(ExecutionNodeId(2), downstream.execution_node_id);
    assert_eq!(ExecutionNodeId(3), id_gen.next_id());

    let analysis = InsertFromSubqueryAnalyzer::new(&functions)
        .analyze(
            &catalog,
            &TableIdent::doc("summary"),
            &[],
            subquery.query_spec.outputs.clone(),
        )
        .unwrap();

    // sum(integer) is a long, the target column is a double.
    assert_eq!(subquery.query_spec.outputs[0], analysis.subquery_outputs[0]);
    assert_eq!(
        "cast(sum(bytes) AS double)",
        analysis.subquery_outputs[1].to_string()
    );
    assert_eq!(Some(DataType::Double), analysis.subquery_outputs[1].value_type());
}

#[test]
fn insert_column_count_mismatch() {
    let functions = Functions::builtin();
    let catalog = catalog();
    let logs = catalog.resolve_table(&TableIdent::doc("logs")).unwrap();

    let err = InsertFromSubqueryAnalyzer::new(&functions)
        .analyze(
            &catalog,
            &TableIdent::doc("summary"),
            &[ColumnIdent::new("host")],
            vec![column(&logs, "host"), column(&logs, "bytes")],
        )
        .unwrap_err();

    assert_eq!(
        "Number of columns in insert statement and subquery differ (insert columns: 1, subquery columns: 2)",
        err.to_string()
    );
    assert!(matches!(
        err,
        PlanError::ColumnCountMismatch {
            insert_columns: 1,
            subquery_columns: 2
        }
    ));
}
