//! Consumers turn analyzed relations into physical plans.
//!
//! Each consumer handles a subset of relation shapes. The planner tries its
//! consumers in priority order, the first to produce a plan wins.

pub mod distributed_group_by;
pub mod group_by;

use std::fmt::Debug;

use tracing::debug;

use super::context::{ConsumerContext, PlannerContext, RelationPosition};
use super::node::ExecutionNodeIdGen;
use super::plan::PlannedRelation;
use crate::analyze::relation::AnalyzedRelation;
use crate::errors::{PlanError, Result};
pub use distributed_group_by::DistributedGroupByConsumer;

pub trait Consumer: Debug + Sync + Send {
    fn name(&self) -> &'static str;

    /// Try to plan the relation.
    ///
    /// Returns `Ok(None)` if this consumer doesn't handle the relation's
    /// shape. Errors are reserved for relations this consumer handles but
    /// can't plan.
    fn consume(
        &self,
        relation: &AnalyzedRelation,
        context: &mut ConsumerContext<'_>,
    ) -> Result<Option<PlannedRelation>>;
}

/// Plans relations by handing them to a list of consumers.
#[derive(Debug)]
pub struct ConsumingPlanner {
    consumers: Vec<Box<dyn Consumer>>,
}

impl Default for ConsumingPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsumingPlanner {
    /// Planner with all builtin consumers.
    pub fn new() -> Self {
        Self::with_consumers(vec![Box::new(DistributedGroupByConsumer)])
    }

    pub fn with_consumers(consumers: Vec<Box<dyn Consumer>>) -> Self {
        ConsumingPlanner { consumers }
    }

    /// Plan the outermost relation of a statement.
    pub fn plan(
        &self,
        relation: &AnalyzedRelation,
        planner_context: &PlannerContext,
    ) -> Result<PlannedRelation> {
        let mut id_gen = ExecutionNodeIdGen::new();
        let mut context = ConsumerContext::new(planner_context, RelationPosition::Root, &mut id_gen);
        self.consume(relation, &mut context)
    }

    /// Plan a relation nested inside a statement assembled by the caller.
    ///
    /// Ids for the nested plan come from `id_gen`, the caller keeps using it
    /// for its own nodes afterwards.
    pub fn plan_nested(
        &self,
        relation: &AnalyzedRelation,
        planner_context: &PlannerContext,
        id_gen: &mut ExecutionNodeIdGen,
    ) -> Result<PlannedRelation> {
        let mut context = ConsumerContext::new(planner_context, RelationPosition::Nested, id_gen);
        self.consume(relation, &mut context)
    }

    fn consume(
        &self,
        relation: &AnalyzedRelation,
        context: &mut ConsumerContext<'_>,
    ) -> Result<PlannedRelation> {
        for consumer in &self.consumers {
            if let Some(plan) = consumer.consume(relation, context)? {
                debug!(consumer = consumer.name(), %relation, position = ?context.position, "planned relation");
                if context.planner.config().verify_plans {
                    plan.verify()?;
                }
                return Ok(plan);
            }
        }

        Err(PlanError::UnsupportedRelation(relation.to_string()))
    }
}
