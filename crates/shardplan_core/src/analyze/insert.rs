//! Analysis of `INSERT INTO table (columns) SELECT ...`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::coercion::{Coercion, CoercionResolver, reconcile};
use crate::catalog::{TableInfo, TableResolver};
use crate::errors::{PlanError, Result};
use crate::functions::Functions;
use crate::symbol::{ColumnIdent, Reference, Symbol, TableIdent};

/// Result of analyzing an insert from a subquery.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertFromSubqueryAnalysis {
    pub table: Arc<TableInfo>,
    /// Target columns, positionally matching `subquery_outputs`.
    pub columns: Vec<Reference>,
    /// Subquery outputs with implicit casts to the target column types.
    pub subquery_outputs: Vec<Symbol>,
}

#[derive(Debug, Clone, Copy)]
pub struct InsertFromSubqueryAnalyzer<'a> {
    functions: &'a Functions,
}

impl<'a> InsertFromSubqueryAnalyzer<'a> {
    pub fn new(functions: &'a Functions) -> Self {
        InsertFromSubqueryAnalyzer { functions }
    }

    pub fn analyze(
        &self,
        resolver: &impl TableResolver,
        table: &TableIdent,
        columns: &[ColumnIdent],
        subquery_outputs: Vec<Symbol>,
    ) -> Result<InsertFromSubqueryAnalysis> {
        let table = resolver.resolve_table(table)?;
        let columns = resolve_insert_columns(&table, columns)?;
        let subquery_outputs = self.reconcile_insert(&columns, &subquery_outputs)?;

        Ok(InsertFromSubqueryAnalysis {
            table,
            columns,
            subquery_outputs,
        })
    }

    /// Reconcile subquery outputs with the target columns they're inserted
    /// into.
    ///
    /// Columns and outputs correspond by position. Outputs whose type differs
    /// from the column type get wrapped in a cast. The inputs are never
    /// modified, a new output list is returned.
    pub fn reconcile_insert(
        &self,
        target_columns: &[Reference],
        subquery_outputs: &[Symbol],
    ) -> Result<Vec<Symbol>> {
        if target_columns.len() != subquery_outputs.len() {
            return Err(PlanError::ColumnCountMismatch {
                insert_columns: target_columns.len(),
                subquery_columns: subquery_outputs.len(),
            });
        }

        // Validate everything before building anything.
        let mut coercions = Vec::with_capacity(target_columns.len());
        for (column, output) in target_columns.iter().zip(subquery_outputs) {
            let source_type = output
                .value_type()
                .ok_or_else(|| PlanError::InvalidSubqueryExpression(output.to_string()))?;

            let coercion = reconcile(&source_type, &column.value_type).map_err(|_| {
                PlanError::ColumnTypeMismatch {
                    expression: output.to_string(),
                    source_type: source_type.clone(),
                    column: column.column().fqn(),
                    target_type: column.value_type.clone(),
                }
            })?;
            coercions.push(coercion);
        }

        let resolver = CoercionResolver::new(self.functions);
        subquery_outputs
            .iter()
            .zip(coercions)
            .zip(target_columns)
            .map(|((output, coercion), column)| {
                if coercion != Coercion::Identical {
                    debug!(
                        %output,
                        column = %column.column(),
                        target = %column.value_type,
                        "casting subquery output for insert"
                    );
                }
                resolver.apply(output.clone(), coercion)
            })
            .collect()
    }
}

/// Resolve the columns targeted by the insert.
///
/// Without an explicit column list the insert targets the full table schema.
pub fn resolve_insert_columns(table: &TableInfo, columns: &[ColumnIdent]) -> Result<Vec<Reference>> {
    if columns.is_empty() {
        return Ok(table.columns.clone());
    }

    let mut seen = HashSet::with_capacity(columns.len());
    columns
        .iter()
        .map(|column| {
            if !seen.insert(column) {
                return Err(PlanError::DuplicateInsertColumn(column.fqn()));
            }
            table
                .get_column(column)
                .cloned()
                .ok_or_else(|| PlanError::ColumnUnknown {
                    table: table.ident.fqn(),
                    column: column.fqn(),
                })
        })
        .collect()
}
