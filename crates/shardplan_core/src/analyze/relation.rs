use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::query_spec::{OrderBy, QuerySpec};
use crate::catalog::TableInfo;
use crate::errors::{PlanError, Result};
use crate::symbol::{IndexType, Reference, Symbol};

/// A plain table used as a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRelation {
    pub table_info: Arc<TableInfo>,
}

impl TableRelation {
    pub fn new(table_info: Arc<TableInfo>) -> Self {
        TableRelation { table_info }
    }

    /// Check that the reference points to an existing column of this table.
    pub fn contains_reference(&self, reference: &Reference) -> bool {
        reference.table() == &self.table_info.ident
            && self.table_info.get_column(reference.column()).is_some()
    }

    /// Validate that all symbols in the ORDER BY can be sorted on.
    ///
    /// Arguments to aggregates aren't checked, only the aggregate's result
    /// is sorted.
    pub fn validate_order_by(&self, order_by: &OrderBy) -> Result<()> {
        for sym in order_by.symbols() {
            let mut invalid = None;
            sym.walk(&mut |child| {
                if invalid.is_some() || child.is_aggregate() {
                    return false;
                }
                if let Symbol::Reference(reference) = child {
                    invalid = sort_violation(reference);
                }
                true
            });

            if let Some(reason) = invalid {
                return Err(PlanError::InvalidOrderByExpression {
                    expression: sym.to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

fn sort_violation(reference: &Reference) -> Option<String> {
    if !reference.value_type.is_sortable() {
        return Some(format!("invalid data type '{}'", reference.value_type));
    }
    match reference.index_type {
        IndexType::Analyzed => {
            Some("sorting on analyzed/fulltext columns is not possible".to_string())
        }
        IndexType::No => Some("sorting on non-indexed columns is not possible".to_string()),
        IndexType::NotAnalyzed => None,
    }
}

/// A query over a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueriedTable {
    pub table_relation: TableRelation,
    pub query_spec: QuerySpec,
}

impl QueriedTable {
    pub fn new(table_info: Arc<TableInfo>, query_spec: QuerySpec) -> Self {
        QueriedTable {
            table_relation: TableRelation::new(table_info),
            query_spec,
        }
    }

    pub fn table_info(&self) -> &TableInfo {
        &self.table_relation.table_info
    }
}

/// The closed set of relation shapes the planner knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalyzedRelation {
    QueriedTable(QueriedTable),
    Table(TableRelation),
}

impl fmt::Display for AnalyzedRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueriedTable(table) => write!(f, "QueriedTable({})", table.table_info().ident),
            Self::Table(table) => write!(f, "Table({})", table.table_info.ident),
        }
    }
}

impl From<QueriedTable> for AnalyzedRelation {
    fn from(value: QueriedTable) -> Self {
        AnalyzedRelation::QueriedTable(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::query_spec::OrderByExpr;
    use crate::symbol::{ColumnIdent, TableIdent};
    use crate::testutil::{agg, column, users_table};
    use crate::types::DataType;

    fn order_by(expr: Symbol) -> OrderBy {
        OrderBy {
            exprs: vec![OrderByExpr::new(expr, true)],
        }
    }

    #[test]
    fn order_by_plain_column() {
        let users = users_table();
        let relation = TableRelation::new(users.clone());
        relation
            .validate_order_by(&order_by(column(&users, "name")))
            .unwrap();
    }

    #[test]
    fn order_by_analyzed_column() {
        let users = users_table();
        let relation = TableRelation::new(users.clone());
        let err = relation
            .validate_order_by(&order_by(column(&users, "bio")))
            .unwrap_err();

        assert_eq!(
            "Cannot ORDER BY 'bio': sorting on analyzed/fulltext columns is not possible",
            err.to_string()
        );
    }

    #[test]
    fn order_by_object_column() {
        let users = users_table();
        let relation = TableRelation::new(users.clone());
        let err = relation
            .validate_order_by(&order_by(column(&users, "details")))
            .unwrap_err();

        assert_eq!(
            "Cannot ORDER BY 'details': invalid data type 'object'",
            err.to_string()
        );
    }

    #[test]
    fn order_by_aggregate_over_analyzed_column() {
        let users = users_table();
        let relation = TableRelation::new(users.clone());
        relation
            .validate_order_by(&order_by(agg("count", vec![column(&users, "bio")])))
            .unwrap();
    }

    #[test]
    fn contains_reference_checks_table() {
        let users = users_table();
        let relation = TableRelation::new(users.clone());

        assert!(relation.contains_reference(&Reference::new(
            TableIdent::doc("users"),
            ColumnIdent::new("name"),
            DataType::String,
        )));
        assert!(!relation.contains_reference(&Reference::new(
            TableIdent::doc("other"),
            ColumnIdent::new("name"),
            DataType::String,
        )));
        assert!(!relation.contains_reference(&Reference::new(
            TableIdent::doc("users"),
            ColumnIdent::new("missing"),
            DataType::String,
        )));
    }
}
