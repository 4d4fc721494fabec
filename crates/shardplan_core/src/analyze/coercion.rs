//! Reconciling a symbol's type with a required target type.

use tracing::trace;

use crate::errors::{PlanError, Result};
use crate::functions::Functions;
use crate::symbol::function::CAST_FUNCTION_NAME;
use crate::symbol::{Function, FunctionArgument, FunctionIdent, Symbol};
use crate::types::DataType;

/// Outcome of reconciling a source type with a target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    /// Types already match.
    Identical,
    /// Values need an implicit cast.
    Cast { from: DataType, to: DataType },
}

/// Decide how values of `source` can be turned into `target`.
pub fn reconcile(source: &DataType, target: &DataType) -> Result<Coercion> {
    if source == target {
        return Ok(Coercion::Identical);
    }

    if !source.is_convertible_to(target) {
        return Err(PlanError::IncompatibleType {
            source_type: source.clone(),
            target_type: target.clone(),
        });
    }

    Ok(Coercion::Cast {
        from: source.clone(),
        to: target.clone(),
    })
}

/// Synthesizes implicit casts using the function catalog.
#[derive(Debug, Clone, Copy)]
pub struct CoercionResolver<'a> {
    functions: &'a Functions,
}

impl<'a> CoercionResolver<'a> {
    pub fn new(functions: &'a Functions) -> Self {
        CoercionResolver { functions }
    }

    /// Apply a coercion to a symbol.
    ///
    /// The cast function has a `(source, target)` signature, the target
    /// position carries only a type tag.
    pub fn apply(&self, symbol: Symbol, coercion: Coercion) -> Result<Symbol> {
        match coercion {
            Coercion::Identical => Ok(symbol),
            Coercion::Cast { from, to } => {
                let ident = FunctionIdent::new(CAST_FUNCTION_NAME, vec![from, to.clone()]);
                let info = self.functions.lookup(&ident)?;
                trace!(%symbol, %ident, "synthesized implicit cast");

                Ok(Symbol::Function(Function::new(
                    info,
                    vec![FunctionArgument::Value(symbol), FunctionArgument::TypeTag(to)],
                )))
            }
        }
    }

    /// Coerce a type-bearing symbol to `target`, casting if needed.
    pub fn coerce(&self, symbol: Symbol, target: &DataType) -> Result<Symbol> {
        let source = symbol
            .value_type()
            .ok_or_else(|| PlanError::InvalidSubqueryExpression(symbol.to_string()))?;
        let coercion = reconcile(&source, target)?;
        self.apply(symbol, coercion)
    }
}
