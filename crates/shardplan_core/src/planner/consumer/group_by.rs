use crate::analyze::relation::TableRelation;
use crate::errors::{PlanError, Result};
use crate::symbol::{IndexType, Reference, Symbol};

/// Check that every group key can be grouped on.
///
/// Keys must not contain aggregates, columns have to belong to the relation
/// and must be of a groupable type with a plain index.
pub fn validate_group_by_symbols(relation: &TableRelation, group_by: &[Symbol]) -> Result<()> {
    for key in group_by {
        let mut reason = None;
        key.walk(&mut |sym| {
            if reason.is_some() {
                return false;
            }
            if sym.is_aggregate() {
                reason = Some("aggregate functions are not allowed in GROUP BY".to_string());
                return false;
            }
            if let Symbol::Reference(reference) = sym {
                reason = group_violation(relation, reference);
            }
            true
        });

        if reason.is_none() {
            if let Some(typ) = key.value_type() {
                if !typ.is_groupable() {
                    reason = Some(format!("invalid data type '{typ}'"));
                }
            }
        }

        if let Some(reason) = reason {
            return Err(PlanError::InvalidGroupExpression {
                expression: key.to_string(),
                reason,
            });
        }
    }
    Ok(())
}

fn group_violation(relation: &TableRelation, reference: &Reference) -> Option<String> {
    if !relation.contains_reference(reference) {
        return Some(format!(
            "column not found in table '{}'",
            relation.table_info.ident
        ));
    }
    if !reference.value_type.is_groupable() {
        return Some(format!("invalid data type '{}'", reference.value_type));
    }
    match reference.index_type {
        IndexType::Analyzed => {
            Some("grouping on analyzed/fulltext columns is not possible".to_string())
        }
        IndexType::No => Some("grouping on non-indexed columns is not possible".to_string()),
        IndexType::NotAnalyzed => None,
    }
}
