//! Table metadata consumed by the planner.

pub mod routing;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use routing::{NodeId, Routing};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::analyze::query_spec::WhereClause;
use crate::errors::{PlanError, Result};
use crate::symbol::{ColumnIdent, Reference, TableIdent};

/// Location of a single (primary) shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardPlacement {
    /// Name of the index holding the shard. Partitioned tables have one
    /// index per partition.
    pub index: String,
    pub shard_id: u32,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub ident: TableIdent,
    /// User visible columns in schema order.
    pub columns: Vec<Reference>,
    #[serde(default)]
    pub shards: Vec<ShardPlacement>,
}

impl TableInfo {
    pub fn get_column(&self, column: &ColumnIdent) -> Option<&Reference> {
        self.columns.iter().find(|c| c.column() == column)
    }

    /// Get the routing for the shards matching the where clause.
    pub fn get_routing(&self, where_clause: &WhereClause) -> Routing {
        let mut routing = Routing::default();
        if where_clause.no_match {
            return routing;
        }

        for shard in &self.shards {
            if !where_clause.partitions.is_empty() && !where_clause.partitions.contains(&shard.index)
            {
                continue;
            }
            routing.add_shard(shard.node.clone(), shard.index.clone(), shard.shard_id);
        }

        trace!(table = %self.ident, shards = routing.num_shards(), "resolved table routing");

        routing
    }
}

/// Resolves table identifiers to table metadata.
pub trait TableResolver {
    fn resolve_table(&self, ident: &TableIdent) -> Result<Arc<TableInfo>>;
}

/// Table metadata held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    tables: BTreeMap<TableIdent, Arc<TableInfo>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: TableInfo) -> Arc<TableInfo> {
        let table = Arc::new(table);
        self.tables.insert(table.ident.clone(), table.clone());
        table
    }
}

impl TableResolver for MemoryCatalog {
    fn resolve_table(&self, ident: &TableIdent) -> Result<Arc<TableInfo>> {
        self.tables
            .get(ident)
            .cloned()
            .ok_or_else(|| PlanError::TableNotFound(ident.fqn()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{partitioned_table, users_table};

    #[test]
    fn routing_all_shards() {
        let users = users_table();
        let routing = users.get_routing(&WhereClause::match_all());

        assert_eq!(4, routing.num_shards());
        assert_eq!(2, routing.nodes().len());
    }

    #[test]
    fn routing_no_match_is_empty() {
        let users = users_table();
        let routing = users.get_routing(&WhereClause::no_match());

        assert!(!routing.has_locations());
    }

    #[test]
    fn routing_restricted_to_partitions() {
        let table = partitioned_table();
        let where_clause = WhereClause {
            partitions: vec![".partitioned.events.2024".to_string()],
            ..WhereClause::match_all()
        };

        let routing = table.get_routing(&where_clause);
        assert_eq!(1, routing.num_shards());
        assert_eq!(vec![NodeId::new("n2")], routing.nodes().into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn resolve_missing_table() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table((*users_table()).clone());

        assert!(catalog.resolve_table(&TableIdent::doc("users")).is_ok());
        let err = catalog.resolve_table(&TableIdent::doc("nope")).unwrap_err();
        assert!(matches!(err, PlanError::TableNotFound(name) if name == "doc.nope"));
    }
}
