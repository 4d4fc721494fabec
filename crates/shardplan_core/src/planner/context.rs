use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::ExecutionNodeIdGen;
use crate::catalog::NodeId;
use crate::config::PlannerConfig;

/// Snapshot of the cluster as seen by the planning node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    /// The node coordinating the query.
    pub local_node: NodeId,
    /// All known nodes, including the local node.
    pub nodes: BTreeSet<NodeId>,
}

impl ClusterState {
    pub fn new(local_node: NodeId, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut nodes: BTreeSet<_> = nodes.into_iter().collect();
        nodes.insert(local_node.clone());
        ClusterState { local_node, nodes }
    }

    /// Cluster consisting of only the local node.
    pub fn single_node(local_node: NodeId) -> Self {
        Self::new(local_node, [])
    }
}

/// Everything planning a single statement needs to know about its
/// environment.
#[derive(Debug, Clone)]
pub struct PlannerContext {
    job_id: Uuid,
    cluster: ClusterState,
    config: PlannerConfig,
}

impl PlannerContext {
    /// Create a context for a new job.
    pub fn new(cluster: ClusterState, config: PlannerConfig) -> Self {
        Self::with_job_id(Uuid::new_v4(), cluster, config)
    }

    pub fn with_job_id(job_id: Uuid, cluster: ClusterState, config: PlannerConfig) -> Self {
        PlannerContext {
            job_id,
            cluster,
            config,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn local_node(&self) -> &NodeId {
        &self.cluster.local_node
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }
}

/// Where the relation being consumed sits in the overall query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationPosition {
    /// Outermost relation, its ordering and limits apply to the client
    /// visible result.
    #[default]
    Root,
    /// Relation nested in some other statement (e.g. the source of an
    /// insert). The enclosing plan assembles the final result.
    Nested,
}

/// State for a single consumer call.
#[derive(Debug)]
pub struct ConsumerContext<'a> {
    pub planner: &'a PlannerContext,
    pub position: RelationPosition,
    /// Generator for execution node ids, shared with whoever assembles the
    /// surrounding plan.
    pub id_gen: &'a mut ExecutionNodeIdGen,
}

impl<'a> ConsumerContext<'a> {
    pub fn new(
        planner: &'a PlannerContext,
        position: RelationPosition,
        id_gen: &'a mut ExecutionNodeIdGen,
    ) -> Self {
        ConsumerContext {
            planner,
            position,
            id_gen,
        }
    }

    pub fn is_root(&self) -> bool {
        self.position == RelationPosition::Root
    }
}
