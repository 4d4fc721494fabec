//! Execution nodes of a distributed plan.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::projection::Projection;
use crate::analyze::query_spec::WhereClause;
use crate::catalog::{NodeId, Routing, TableInfo};
use crate::symbol::{Symbol, TableIdent};
use crate::types::DataType;

/// ID of a single execution node (a collect or merge stage).
///
/// Unique within a job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExecutionNodeId(pub u32);

impl fmt::Display for ExecutionNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Used for ensuring every execution node in a job has a unique id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionNodeIdGen {
    next: ExecutionNodeId,
}

impl ExecutionNodeIdGen {
    pub const fn new() -> Self {
        ExecutionNodeIdGen {
            next: ExecutionNodeId(0),
        }
    }

    /// Continue handing out ids after some ids have already been taken.
    pub const fn starting_at(id: ExecutionNodeId) -> Self {
        ExecutionNodeIdGen { next: id }
    }

    pub fn next_id(&mut self) -> ExecutionNodeId {
        let id = self.next;
        self.next.0 += 1;
        id
    }

    /// Reserve an id for a node that isn't built yet.
    ///
    /// The id is allocated immediately so nodes built later never collide
    /// with it.
    pub fn reserve(&mut self) -> ExecutionNodeId {
        self.next_id()
    }

    /// The id the next call to `next_id` will return.
    pub const fn peek(&self) -> ExecutionNodeId {
        self.next
    }
}

/// Where an execution node sends its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downstream {
    pub nodes: BTreeSet<NodeId>,
    pub execution_node_id: ExecutionNodeId,
}

/// Scatter phase stage, reading table data on the nodes holding the shards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectNode {
    pub id: ExecutionNodeId,
    pub name: String,
    pub job_id: Uuid,
    pub table: TableIdent,
    pub routing: Routing,
    pub where_clause: WhereClause,
    /// Symbols read for every row, inputs to the first projection.
    pub to_collect: Vec<Symbol>,
    pub projections: Vec<Projection>,
    pub downstream: Option<Downstream>,
}

impl CollectNode {
    /// Collect node that distributes its results to reducers.
    ///
    /// The downstream is filled in once the reducer is built.
    pub fn distributing(
        id: ExecutionNodeId,
        job_id: Uuid,
        table: &TableInfo,
        where_clause: &WhereClause,
        routing: Routing,
        to_collect: Vec<Symbol>,
        projections: Vec<Projection>,
    ) -> Self {
        CollectNode {
            id,
            name: "distributing collect".to_string(),
            job_id,
            table: table.ident.clone(),
            routing,
            where_clause: where_clause.clone(),
            to_collect,
            projections,
            downstream: None,
        }
    }

    pub fn execution_nodes(&self) -> BTreeSet<NodeId> {
        self.routing.nodes()
    }

    /// Types of the rows this node emits.
    pub fn output_types(&self) -> Vec<DataType> {
        match self.projections.last() {
            Some(projection) => projection.output_types(),
            None => symbol_types(&self.to_collect),
        }
    }
}

/// Gather phase stage, merging rows sent by upstream execution nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeNode {
    pub id: ExecutionNodeId,
    pub name: String,
    pub job_id: Uuid,
    /// Execution nodes feeding this merge.
    pub upstream: Vec<ExecutionNodeId>,
    /// Number of cluster nodes sending rows.
    pub num_upstreams: usize,
    pub input_types: Vec<DataType>,
    /// Cluster nodes this merge runs on.
    pub execution_nodes: BTreeSet<NodeId>,
    pub projections: Vec<Projection>,
    /// None for terminal merges handing rows to the client.
    pub downstream: Option<Downstream>,
}

impl MergeNode {
    /// Reduce stage running on the same nodes as the collect stage feeding
    /// it.
    ///
    /// Falls back to `local_node` if the collect stage has no nodes to run
    /// on.
    pub fn distributed(
        id: ExecutionNodeId,
        job_id: Uuid,
        collect: &CollectNode,
        local_node: &NodeId,
        projections: Vec<Projection>,
    ) -> Self {
        let upstream_nodes = collect.execution_nodes();
        let execution_nodes = if collect.routing.has_locations() {
            upstream_nodes.clone()
        } else {
            BTreeSet::from([local_node.clone()])
        };

        MergeNode {
            id,
            name: "distributed merge".to_string(),
            job_id,
            upstream: vec![collect.id],
            num_upstreams: upstream_nodes.len(),
            input_types: collect.output_types(),
            execution_nodes,
            projections,
            downstream: None,
        }
    }

    /// Final merge running only on the local (coordinating) node.
    pub fn local(
        id: ExecutionNodeId,
        job_id: Uuid,
        upstream: &MergeNode,
        local_node: &NodeId,
        projections: Vec<Projection>,
    ) -> Self {
        MergeNode {
            id,
            name: "local merge".to_string(),
            job_id,
            upstream: vec![upstream.id],
            num_upstreams: upstream.execution_nodes.len(),
            input_types: upstream.output_types(),
            execution_nodes: BTreeSet::from([local_node.clone()]),
            projections,
            downstream: None,
        }
    }

    pub fn output_types(&self) -> Vec<DataType> {
        match self.projections.last() {
            Some(projection) => projection.output_types(),
            None => self.input_types.clone(),
        }
    }
}

fn symbol_types(symbols: &[Symbol]) -> Vec<DataType> {
    symbols
        .iter()
        .map(|sym| sym.value_type().unwrap_or(DataType::Undefined))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{column, users_table};

    #[test]
    fn id_gen_sequential() {
        let mut id_gen = ExecutionNodeIdGen::new();
        assert_eq!(ExecutionNodeId(0), id_gen.next_id());
        assert_eq!(ExecutionNodeId(1), id_gen.reserve());
        assert_eq!(ExecutionNodeId(2), id_gen.peek());
        assert_eq!(ExecutionNodeId(2), id_gen.next_id());
    }

    #[test]
    fn id_gen_default_starts_at_zero() {
        let mut id_gen = ExecutionNodeIdGen::default();
        assert_eq!(ExecutionNodeIdGen::new(), id_gen);
        assert_eq!(ExecutionNodeId(0), id_gen.next_id());
    }

    #[test]
    fn id_gen_starting_at() {
        let mut id_gen = ExecutionNodeIdGen::starting_at(ExecutionNodeId(5));
        assert_eq!(ExecutionNodeId(5), id_gen.next_id());
    }

    #[test]
    fn distributed_merge_without_locations_runs_locally() {
        let users = users_table();
        let collect = CollectNode::distributing(
            ExecutionNodeId(0),
            Uuid::nil(),
            &users,
            &WhereClause::no_match(),
            Routing::default(),
            vec![column(&users, "name")],
            Vec::new(),
        );

        let merge = MergeNode::distributed(
            ExecutionNodeId(1),
            Uuid::nil(),
            &collect,
            &NodeId::new("local"),
            Vec::new(),
        );

        assert_eq!(0, merge.num_upstreams);
        assert_eq!(BTreeSet::from([NodeId::new("local")]), merge.execution_nodes);
        assert_eq!(vec![DataType::String], merge.input_types);
    }
}
