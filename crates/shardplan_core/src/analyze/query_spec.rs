use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, Result};
use crate::symbol::Symbol;

/// Analyzed WHERE clause of a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub query: Option<Symbol>,
    /// The analyzer proved the predicate can't match any rows.
    #[serde(default)]
    pub no_match: bool,
    /// Filter on the `_version` system column, pinning reads to a specific
    /// row version.
    #[serde(default)]
    pub version: Option<Symbol>,
    /// Partitions (index names) the predicate restricts the scan to. Empty
    /// means all partitions.
    #[serde(default)]
    pub partitions: Vec<String>,
}

impl WhereClause {
    pub const fn match_all() -> Self {
        WhereClause {
            query: None,
            no_match: false,
            version: None,
            partitions: Vec::new(),
        }
    }

    pub const fn no_match() -> Self {
        WhereClause {
            query: None,
            no_match: true,
            version: None,
            partitions: Vec::new(),
        }
    }

    pub fn has_versions(&self) -> bool {
        self.version.is_some()
    }
}

impl Default for WhereClause {
    fn default() -> Self {
        Self::match_all()
    }
}

/// Analyzed HAVING clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HavingClause {
    pub query: Option<Symbol>,
    #[serde(default)]
    pub no_match: bool,
}

impl HavingClause {
    pub fn new(query: Symbol) -> Self {
        HavingClause {
            query: Some(query),
            no_match: false,
        }
    }

    pub const fn no_match() -> Self {
        HavingClause {
            query: None,
            no_match: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByExpr {
    pub expr: Symbol,
    pub asc: bool,
    pub nulls_first: bool,
}

impl OrderByExpr {
    /// Ascending with nulls last, descending with nulls first.
    pub fn new(expr: Symbol, asc: bool) -> Self {
        OrderByExpr {
            expr,
            asc,
            nulls_first: !asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub exprs: Vec<OrderByExpr>,
}

impl OrderBy {
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.exprs.iter().map(|expr| &expr.expr)
    }
}

/// The analyzed shape of a single relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub outputs: Vec<Symbol>,
    #[serde(default)]
    pub where_clause: WhereClause,
    #[serde(default)]
    pub group_by: Option<Vec<Symbol>>,
    #[serde(default)]
    pub having: Option<HavingClause>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl QuerySpec {
    pub fn new(outputs: Vec<Symbol>) -> Self {
        QuerySpec {
            outputs,
            where_clause: WhereClause::match_all(),
            group_by: None,
            having: None,
            order_by: None,
            limit: None,
            offset: 0,
        }
    }

    /// Check that all outputs are computed from group keys and aggregates
    /// only.
    ///
    /// Literals may appear anywhere. Columns have to be covered by a group
    /// key or be the argument of an aggregate. The same holds for the having
    /// predicate and the order by.
    pub fn validate_group_by_outputs(&self) -> Result<()> {
        let group_by = match &self.group_by {
            Some(group_by) => group_by,
            None => return Ok(()),
        };

        let having = self.having.as_ref().and_then(|having| having.query.as_ref());
        let order_by = self.order_by.iter().flat_map(|order_by| order_by.symbols());

        for output in self.outputs.iter().chain(having).chain(order_by) {
            let mut ungrouped = None;
            output.walk(&mut |sym| {
                if ungrouped.is_some() || group_by.contains(sym) || sym.is_aggregate() {
                    return false;
                }
                if matches!(sym, Symbol::Reference(_)) {
                    ungrouped = Some(sym.to_string());
                }
                true
            });

            if let Some(column) = ungrouped {
                return Err(PlanError::UngroupedOutput(column));
            }
        }

        Ok(())
    }
}
