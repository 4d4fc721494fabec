//! JSON requests accepted by the command line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shardplan_core::analyze::relation::AnalyzedRelation;
use shardplan_core::catalog::TableInfo;
use shardplan_core::planner::context::{ClusterState, RelationPosition};
use shardplan_core::symbol::{ColumnIdent, Symbol};
use shardplan_core::types::scalar::ScalarValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub cluster: ClusterState,
    pub relation: AnalyzedRelation,
    #[serde(default)]
    pub position: RelationPosition,
    /// Planner settings by name.
    #[serde(default)]
    pub settings: BTreeMap<String, ScalarValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertRequest {
    /// Target table.
    pub table: TableInfo,
    /// Target columns, the full table schema if empty.
    #[serde(default)]
    pub columns: Vec<ColumnIdent>,
    /// Outputs of the subquery providing the rows.
    pub outputs: Vec<Symbol>,
}
