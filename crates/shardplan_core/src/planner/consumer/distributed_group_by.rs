//! Plans group by queries on a single table as a distributed aggregation.
//!
//! Shard nodes group their rows and emit partial aggregate states. The states
//! are sent to reducers (running on the same set of nodes), which merge them
//! into final values. For the root relation a last merge on the coordinating
//! node applies the final ordering, offset and limit.

use std::collections::BTreeSet;

use tracing::debug;

use super::Consumer;
use super::group_by::validate_group_by_symbols;
use crate::analyze::relation::{AnalyzedRelation, QueriedTable};
use crate::errors::{PlanError, Result};
use crate::planner::context::ConsumerContext;
use crate::planner::node::{CollectNode, Downstream, MergeNode};
use crate::planner::plan::{DistributedGroupBy, NoopPlan, PlannedRelation};
use crate::planner::projection::Projection;
use crate::planner::projection::builder::ProjectionBuilder;
use crate::symbol::{AggregationStep, Symbol, format_symbols};

#[derive(Debug, Clone, Copy, Default)]
pub struct DistributedGroupByConsumer;

impl Consumer for DistributedGroupByConsumer {
    fn name(&self) -> &'static str {
        "distributed_group_by"
    }

    fn consume(
        &self,
        relation: &AnalyzedRelation,
        context: &mut ConsumerContext<'_>,
    ) -> Result<Option<PlannedRelation>> {
        match relation {
            AnalyzedRelation::QueriedTable(table) => plan_queried_table(relation, table, context),
            AnalyzedRelation::Table(_) => Ok(None),
        }
    }
}

fn plan_queried_table(
    relation: &AnalyzedRelation,
    table: &QueriedTable,
    context: &mut ConsumerContext<'_>,
) -> Result<Option<PlannedRelation>> {
    let spec = &table.query_spec;
    let group_by = match &spec.group_by {
        Some(group_by) if !group_by.is_empty() => group_by,
        _ => return Ok(None),
    };

    let table_info = table.table_info();
    let job_id = context.planner.job_id();
    let local_node = context.planner.local_node().clone();

    if spec.where_clause.has_versions() {
        return Err(PlanError::UnsupportedConstraint(
            "\"_version\" column is not valid in the WHERE clause of a GROUP BY query",
        ));
    }
    validate_group_by_symbols(&table.table_relation, group_by)?;
    spec.validate_group_by_outputs()?;

    let routing = table_info.get_routing(&spec.where_clause);

    let builder = ProjectionBuilder::new(spec);
    let split = builder.split_points();

    // Collect: group raw rows into partial states.
    let collect_group = builder.group_projection(
        &split.leaves,
        group_by,
        &split.aggregates,
        AggregationStep::Iter,
        AggregationStep::Partial,
    )?;

    // Reduce: merge partial states into final values.
    let collect_outputs: Vec<Symbol> = group_by.iter().chain(&split.aggregates).cloned().collect();

    let mut reduce_projections: Vec<Projection> = vec![
        builder
            .group_projection(
                &collect_outputs,
                group_by,
                &split.aggregates,
                AggregationStep::Partial,
                AggregationStep::Final,
            )?
            .into(),
    ];

    if let Some(order_by) = &spec.order_by {
        table.table_relation.validate_order_by(order_by)?;
    }

    if let Some(having) = &spec.having {
        if having.no_match {
            debug!(table = %table_info.ident, "having clause never matches, planning noop");
            return Ok(Some(PlannedRelation::Noop(NoopPlan {
                relation: Box::new(relation.clone()),
                job_id,
            })));
        }
        if let Some(query) = &having.query {
            reduce_projections.push(builder.filter_projection(&collect_outputs, query)?.into());
        }
    }

    // Root relations order and limit at the reduce phase too, each reducer
    // only needs to send its first `offset + limit` rows. Order by symbols
    // not part of the outputs are carried along for the local merge.
    let mut reduce_outputs = spec.outputs.clone();
    let local_top_n = if context.is_root() {
        if let Some(order_by) = &spec.order_by {
            for sym in order_by.symbols() {
                if !reduce_outputs.contains(sym) {
                    reduce_outputs.push(sym.clone());
                }
            }
        }

        let limit = spec
            .limit
            .unwrap_or(context.planner.config().default_select_limit)
            .saturating_add(spec.offset);
        reduce_projections.push(
            builder
                .top_n_projection(
                    &collect_outputs,
                    spec.order_by.as_ref(),
                    0,
                    Some(limit),
                    Some(reduce_outputs.as_slice()),
                )?
                .into(),
        );

        let output_remap =
            (reduce_outputs.len() > spec.outputs.len()).then_some(spec.outputs.as_slice());
        Some(builder.top_n_projection(
            &reduce_outputs,
            spec.order_by.as_ref(),
            spec.offset,
            spec.limit,
            output_remap,
        )?)
    } else {
        None
    };

    let mut collect = CollectNode::distributing(
        context.id_gen.next_id(),
        job_id,
        table_info,
        &spec.where_clause,
        routing,
        split.leaves,
        vec![collect_group.into()],
    );

    let mut reduce = MergeNode::distributed(
        context.id_gen.next_id(),
        job_id,
        &collect,
        &local_node,
        reduce_projections,
    );

    let local_merge = match local_top_n {
        Some(top_n) => {
            let local_merge = MergeNode::local(
                context.id_gen.next_id(),
                job_id,
                &reduce,
                &local_node,
                vec![top_n.into()],
            );
            reduce.downstream = Some(Downstream {
                nodes: local_merge.execution_nodes.clone(),
                execution_node_id: local_merge.id,
            });
            Some(local_merge)
        }
        None => {
            // The enclosing plan builds the node receiving the reduced rows.
            reduce.downstream = Some(Downstream {
                nodes: BTreeSet::from([local_node]),
                execution_node_id: context.id_gen.reserve(),
            });
            None
        }
    };

    collect.downstream = Some(Downstream {
        nodes: reduce.execution_nodes.clone(),
        execution_node_id: reduce.id,
    });

    debug!(
        table = %table_info.ident,
        group_by = %format_symbols(group_by),
        nodes = collect.execution_nodes().len(),
        root = context.is_root(),
        collect = %collect.id,
        reduce = %reduce.id,
        "planned distributed group by"
    );

    Ok(Some(PlannedRelation::DistributedGroupBy(DistributedGroupBy {
        collect,
        reduce,
        local_merge,
        job_id,
    })))
}
