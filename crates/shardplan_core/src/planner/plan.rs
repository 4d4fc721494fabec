use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::{CollectNode, ExecutionNodeId, MergeNode};
use super::projection::Projection;
use crate::analyze::relation::AnalyzedRelation;
use crate::errors::{Result, internal};
use crate::symbol::AggregationStep;

/// A relation turned into an executable plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannedRelation {
    DistributedGroupBy(DistributedGroupBy),
    Noop(NoopPlan),
}

impl PlannedRelation {
    pub fn job_id(&self) -> Uuid {
        match self {
            Self::DistributedGroupBy(plan) => plan.job_id,
            Self::Noop(plan) => plan.job_id,
        }
    }

    /// Check the column bookkeeping between all stages of the plan.
    pub fn verify(&self) -> Result<()> {
        match self {
            Self::DistributedGroupBy(plan) => plan.verify(),
            Self::Noop(_) => Ok(()),
        }
    }
}

/// Plan for a relation known to produce no rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoopPlan {
    pub relation: Box<AnalyzedRelation>,
    pub job_id: Uuid,
}

/// Group by executed in three phases: collect on the shard nodes, reduce on
/// the same nodes, then an optional merge on the coordinating node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedGroupBy {
    pub collect: CollectNode,
    pub reduce: MergeNode,
    /// Only present for root relations.
    pub local_merge: Option<MergeNode>,
    pub job_id: Uuid,
}

impl DistributedGroupBy {
    pub fn verify(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for id in self.node_ids() {
            if !ids.insert(id) {
                return Err(internal!("Duplicate execution node id {id}"));
            }
        }

        verify_group_steps(
            "collect",
            &self.collect.projections,
            AggregationStep::Iter,
            AggregationStep::Partial,
        )?;
        verify_projection_chain("collect", self.collect.to_collect.len(), &self.collect.projections)?;

        match &self.collect.downstream {
            Some(downstream) if downstream.execution_node_id == self.reduce.id => (),
            other => {
                return Err(internal!(
                    "Collect downstream {other:?} doesn't point to reduce node {}",
                    self.reduce.id
                ));
            }
        }

        verify_inputs("reduce", &self.reduce, self.collect.output_types().len())?;
        verify_group_steps(
            "reduce",
            &self.reduce.projections,
            AggregationStep::Partial,
            AggregationStep::Final,
        )?;
        verify_projection_chain("reduce", self.reduce.input_types.len(), &self.reduce.projections)?;

        let reduce_downstream = self
            .reduce
            .downstream
            .as_ref()
            .ok_or_else(|| internal!("Reduce node {} has no downstream", self.reduce.id))?;

        if let Some(local_merge) = &self.local_merge {
            if reduce_downstream.execution_node_id != local_merge.id {
                return Err(internal!(
                    "Reduce downstream {} doesn't point to local merge {}",
                    reduce_downstream.execution_node_id,
                    local_merge.id
                ));
            }
            verify_inputs("local merge", local_merge, self.reduce.output_types().len())?;
            verify_projection_chain(
                "local merge",
                local_merge.input_types.len(),
                &local_merge.projections,
            )?;
        }

        Ok(())
    }

    fn node_ids(&self) -> impl Iterator<Item = ExecutionNodeId> + '_ {
        [self.collect.id, self.reduce.id]
            .into_iter()
            .chain(self.local_merge.as_ref().map(|merge| merge.id))
    }
}

fn verify_inputs(stage: &str, merge: &MergeNode, upstream_width: usize) -> Result<()> {
    if merge.input_types.len() != upstream_width {
        return Err(internal!(
            "{stage}: expected {upstream_width} input columns, got {}",
            merge.input_types.len()
        ));
    }
    Ok(())
}

/// The first projection of the stage has to move aggregates between the
/// given steps.
fn verify_group_steps(
    stage: &str,
    projections: &[Projection],
    from: AggregationStep,
    to: AggregationStep,
) -> Result<()> {
    match projections.first() {
        Some(Projection::Group(group)) if group.from_step == from && group.to_step == to => {
            if let Some(agg) = group
                .values
                .iter()
                .find(|agg| agg.from_step != from || agg.to_step != to)
            {
                return Err(internal!(
                    "{stage}: aggregate '{agg}' moves {} -> {}, expected {from} -> {to}",
                    agg.from_step,
                    agg.to_step
                ));
            }
            Ok(())
        }
        other => Err(internal!(
            "{stage}: expected group projection {from} -> {to}, got {:?}",
            other.map(Projection::kind_name)
        )),
    }
}

/// Every projection may only reference columns produced by the projection
/// before it.
fn verify_projection_chain(stage: &str, input_width: usize, projections: &[Projection]) -> Result<()> {
    let mut width = input_width;
    for projection in projections {
        if let Some(idx) = projection
            .referenced_inputs()
            .into_iter()
            .find(|idx| *idx >= width)
        {
            return Err(internal!(
                "{stage}: {} projection references input {idx}, only {width} columns available",
                projection.kind_name()
            ));
        }
        width = projection.output_types().len();
    }
    Ok(())
}
