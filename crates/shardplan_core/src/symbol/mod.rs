//! Symbols are the expression nodes of analyzed queries and plans.

pub mod function;
pub mod reference;

use std::fmt;

pub use function::{
    Aggregation,
    AggregationStep,
    Function,
    FunctionArgument,
    FunctionIdent,
    FunctionInfo,
    FunctionKind,
};
pub use reference::{ColumnIdent, IndexType, Reference, ReferenceIdent, TableIdent};
use serde::{Deserialize, Serialize};

use crate::types::DataType;
use crate::types::scalar::ScalarValue;

/// A constant with its resolved type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: ScalarValue,
    pub value_type: DataType,
}

/// Points at a column of the rows produced by the preceding plan stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputColumn {
    pub index: usize,
    pub value_type: DataType,
}

/// Positional statement parameter (`$1`, `$2`, ...).
///
/// Parameter types are only known once values get bound, so parameters
/// don't carry a value type while planning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Symbol {
    Reference(Reference),
    Literal(Literal),
    Function(Function),
    Aggregation(Aggregation),
    InputColumn(InputColumn),
    Parameter(Parameter),
}

impl Symbol {
    pub fn literal(value: impl Into<ScalarValue>, value_type: DataType) -> Self {
        Symbol::Literal(Literal {
            value: value.into(),
            value_type,
        })
    }

    pub fn input_column(index: usize, value_type: DataType) -> Self {
        Symbol::InputColumn(InputColumn { index, value_type })
    }

    /// Resolved value type of this symbol.
    ///
    /// Returns None for symbols that aren't type-bearing.
    pub fn value_type(&self) -> Option<DataType> {
        match self {
            Self::Reference(r) => Some(r.value_type.clone()),
            Self::Literal(l) => Some(l.value_type.clone()),
            Self::Function(f) => Some(f.info.return_type.clone()),
            Self::Aggregation(a) => Some(a.value_type()),
            Self::InputColumn(c) => Some(c.value_type.clone()),
            Self::Parameter(_) => None,
        }
    }

    /// If this is an unsplit aggregate function call.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Symbol::Function(f) if f.info.is_aggregate())
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Symbol::Literal(_))
    }

    /// Direct child symbols.
    pub fn children(&self) -> Vec<&Symbol> {
        match self {
            Self::Function(f) => f.value_arguments().collect(),
            Self::Aggregation(a) => a.inputs.iter().collect(),
            Self::Reference(_) | Self::Literal(_) | Self::InputColumn(_) | Self::Parameter(_) => {
                Vec::new()
            }
        }
    }

    /// Pre-order walk over this symbol and all of its children.
    ///
    /// Returning false from `func` skips the children of that symbol.
    pub fn walk<'a, F>(&'a self, func: &mut F)
    where
        F: FnMut(&'a Symbol) -> bool,
    {
        if func(self) {
            for child in self.children() {
                child.walk(func);
            }
        }
    }

    /// Rewrite this symbol top-down.
    ///
    /// `func` is called on a symbol first. If it returns `Some`, that symbol
    /// is used as the replacement and its children aren't visited. Otherwise
    /// the children are rewritten.
    pub fn rewrite<F, E>(self, func: &mut F) -> Result<Symbol, E>
    where
        F: FnMut(&Symbol) -> Result<Option<Symbol>, E>,
    {
        if let Some(replaced) = func(&self)? {
            return Ok(replaced);
        }

        Ok(match self {
            Self::Function(mut f) => {
                let arguments = std::mem::take(&mut f.arguments);
                f.arguments = arguments
                    .into_iter()
                    .map(|arg| match arg {
                        FunctionArgument::Value(sym) => sym.rewrite(func).map(FunctionArgument::Value),
                        tag @ FunctionArgument::TypeTag(_) => Ok(tag),
                    })
                    .collect::<Result<Vec<_>, E>>()?;
                Self::Function(f)
            }
            Self::Aggregation(mut a) => {
                let inputs = std::mem::take(&mut a.inputs);
                a.inputs = inputs
                    .into_iter()
                    .map(|input| input.rewrite(func))
                    .collect::<Result<Vec<_>, E>>()?;
                Self::Aggregation(a)
            }
            other => other,
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(r) => write!(f, "{r}"),
            Self::Literal(l) => write!(f, "{}", l.value),
            Self::Function(func) => write!(f, "{func}"),
            Self::Aggregation(agg) => write!(f, "{agg}"),
            Self::InputColumn(c) => write!(f, "INPUT({})", c.index),
            Self::Parameter(p) => write!(f, "${}", p.index),
        }
    }
}

impl From<Reference> for Symbol {
    fn from(value: Reference) -> Self {
        Symbol::Reference(value)
    }
}

impl From<Function> for Symbol {
    fn from(value: Function) -> Self {
        Symbol::Function(value)
    }
}

impl From<Aggregation> for Symbol {
    fn from(value: Aggregation) -> Self {
        Symbol::Aggregation(value)
    }
}

/// Format a list of symbols as a comma separated string.
pub fn format_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|sym| sym.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{agg, column, gt, lit_int, users_table};

    #[test]
    fn parameter_not_type_bearing() {
        let sym = Symbol::Parameter(Parameter { index: 1 });
        assert_eq!(None, sym.value_type());
        assert_eq!("$1", sym.to_string());
    }

    #[test]
    fn display_nested() {
        let users = users_table();
        let sym = gt(agg("count", vec![column(&users, "name")]), lit_int(2));
        assert_eq!("(count(name) > 2)", sym.to_string());
    }

    #[test]
    fn walk_skips_children() {
        let users = users_table();
        let sym = gt(agg("count", vec![column(&users, "name")]), lit_int(2));

        let mut visited = Vec::new();
        sym.walk(&mut |s| {
            visited.push(s.to_string());
            !s.is_aggregate()
        });

        assert_eq!(vec!["(count(name) > 2)", "count(name)", "2"], visited);
    }

    #[test]
    fn rewrite_replaces_matches() {
        let users = users_table();
        let name = column(&users, "name");
        let sym = gt(name.clone(), lit_int(2));

        let rewritten = sym
            .rewrite::<_, ()>(&mut |s| {
                Ok((s == &name).then(|| Symbol::input_column(0, DataType::String)))
            })
            .unwrap();

        assert_eq!("(INPUT(0) > 2)", rewritten.to_string());
    }
}
