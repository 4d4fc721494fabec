//! Function catalog.
//!
//! Functions are looked up by their identity (name + argument types). Each
//! builtin function set resolves the return type for a list of argument
//! types, or rejects the signature.

use std::collections::HashMap;

use crate::errors::{PlanError, Result};
use crate::symbol::function::CAST_FUNCTION_NAME;
use crate::symbol::{FunctionIdent, FunctionInfo, FunctionKind};
use crate::types::DataType;

#[derive(Debug)]
pub struct FunctionSet {
    pub name: &'static str,
    pub kind: FunctionKind,
    /// Resolve the return type for the given argument types.
    pub resolve: fn(&[DataType]) -> Option<DataType>,
}

pub const BUILTIN_FUNCTION_SETS: &[FunctionSet] = &[
    FunctionSet {
        name: CAST_FUNCTION_NAME,
        kind: FunctionKind::Scalar,
        resolve: resolve_cast,
    },
    // Aggregates
    FunctionSet {
        name: "count",
        kind: FunctionKind::Aggregate,
        resolve: resolve_count,
    },
    FunctionSet {
        name: "sum",
        kind: FunctionKind::Aggregate,
        resolve: resolve_sum,
    },
    FunctionSet {
        name: "avg",
        kind: FunctionKind::Aggregate,
        resolve: resolve_avg,
    },
    FunctionSet {
        name: "min",
        kind: FunctionKind::Aggregate,
        resolve: resolve_same_as_sortable_input,
    },
    FunctionSet {
        name: "max",
        kind: FunctionKind::Aggregate,
        resolve: resolve_same_as_sortable_input,
    },
    FunctionSet {
        name: "arbitrary",
        kind: FunctionKind::Aggregate,
        resolve: resolve_same_as_input,
    },
    // Arithmetic
    FunctionSet {
        name: "add",
        kind: FunctionKind::Scalar,
        resolve: resolve_arithmetic,
    },
    FunctionSet {
        name: "subtract",
        kind: FunctionKind::Scalar,
        resolve: resolve_arithmetic,
    },
    FunctionSet {
        name: "multiply",
        kind: FunctionKind::Scalar,
        resolve: resolve_arithmetic,
    },
    // Operators
    FunctionSet {
        name: "op_=",
        kind: FunctionKind::Scalar,
        resolve: resolve_comparison,
    },
    FunctionSet {
        name: "op_<",
        kind: FunctionKind::Scalar,
        resolve: resolve_comparison,
    },
    FunctionSet {
        name: "op_>",
        kind: FunctionKind::Scalar,
        resolve: resolve_comparison,
    },
    FunctionSet {
        name: "op_<=",
        kind: FunctionKind::Scalar,
        resolve: resolve_comparison,
    },
    FunctionSet {
        name: "op_>=",
        kind: FunctionKind::Scalar,
        resolve: resolve_comparison,
    },
    FunctionSet {
        name: "op_and",
        kind: FunctionKind::Scalar,
        resolve: resolve_boolean_binary,
    },
    FunctionSet {
        name: "op_or",
        kind: FunctionKind::Scalar,
        resolve: resolve_boolean_binary,
    },
    FunctionSet {
        name: "op_not",
        kind: FunctionKind::Scalar,
        resolve: resolve_boolean_unary,
    },
];

/// Catalog of functions available to the planner.
#[derive(Debug)]
pub struct Functions {
    sets: HashMap<&'static str, &'static FunctionSet>,
}

impl Functions {
    /// Catalog containing all builtin functions.
    pub fn builtin() -> Self {
        let sets = BUILTIN_FUNCTION_SETS
            .iter()
            .map(|set| (set.name, set))
            .collect();
        Functions { sets }
    }

    /// Look up the function matching the identity.
    pub fn lookup(&self, ident: &FunctionIdent) -> Result<FunctionInfo> {
        let set = self
            .sets
            .get(ident.name.as_str())
            .ok_or_else(|| PlanError::UnknownFunction(ident.to_string()))?;

        let return_type = (set.resolve)(&ident.argument_types)
            .ok_or_else(|| PlanError::UnknownFunction(ident.to_string()))?;

        Ok(FunctionInfo {
            ident: ident.clone(),
            return_type,
            kind: set.kind,
        })
    }
}

impl Default for Functions {
    fn default() -> Self {
        Self::builtin()
    }
}

/// `cast(value, target)`, the second argument only carries the target type.
fn resolve_cast(args: &[DataType]) -> Option<DataType> {
    match args {
        [from, to] if from.is_convertible_to(to) => Some(to.clone()),
        _ => None,
    }
}

fn resolve_count(args: &[DataType]) -> Option<DataType> {
    match args {
        [] | [_] => Some(DataType::Long),
        _ => None,
    }
}

fn resolve_sum(args: &[DataType]) -> Option<DataType> {
    match args {
        [typ] if typ.is_integral() => Some(DataType::Long),
        [DataType::Float | DataType::Double] => Some(DataType::Double),
        _ => None,
    }
}

fn resolve_avg(args: &[DataType]) -> Option<DataType> {
    match args {
        [typ] if typ.is_numeric() => Some(DataType::Double),
        _ => None,
    }
}

fn resolve_same_as_sortable_input(args: &[DataType]) -> Option<DataType> {
    match args {
        [typ] if typ.is_sortable() => Some(typ.clone()),
        _ => None,
    }
}

fn resolve_same_as_input(args: &[DataType]) -> Option<DataType> {
    match args {
        [typ] => Some(typ.clone()),
        _ => None,
    }
}

fn resolve_arithmetic(args: &[DataType]) -> Option<DataType> {
    match args {
        [left, right] if left.is_integral() && right.is_integral() => Some(DataType::Long),
        [left, right] if left.is_numeric() && right.is_numeric() => Some(DataType::Double),
        _ => None,
    }
}

fn resolve_comparison(args: &[DataType]) -> Option<DataType> {
    match args {
        [left, right] if left.is_convertible_to(right) || right.is_convertible_to(left) => {
            Some(DataType::Boolean)
        }
        _ => None,
    }
}

fn resolve_boolean_binary(args: &[DataType]) -> Option<DataType> {
    match args {
        [DataType::Boolean, DataType::Boolean] => Some(DataType::Boolean),
        _ => None,
    }
}

fn resolve_boolean_unary(args: &[DataType]) -> Option<DataType> {
    match args {
        [DataType::Boolean] => Some(DataType::Boolean),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_cast() {
        let functions = Functions::builtin();
        let info = functions
            .lookup(&FunctionIdent::new(
                CAST_FUNCTION_NAME,
                vec![DataType::String, DataType::Integer],
            ))
            .unwrap();

        assert_eq!(DataType::Integer, info.return_type);
        assert_eq!(FunctionKind::Scalar, info.kind);
    }

    #[test]
    fn lookup_cast_not_convertible() {
        let functions = Functions::builtin();
        let err = functions
            .lookup(&FunctionIdent::new(
                CAST_FUNCTION_NAME,
                vec![DataType::Object, DataType::Integer],
            ))
            .unwrap_err();

        assert!(matches!(err, PlanError::UnknownFunction(_)));
    }

    #[test]
    fn lookup_unknown_name() {
        let functions = Functions::builtin();
        let err = functions
            .lookup(&FunctionIdent::new("does_not_exist", vec![]))
            .unwrap_err();

        assert_eq!(
            "Cannot resolve function: does_not_exist()",
            err.to_string()
        );
    }

    #[test]
    fn sum_return_types() {
        let functions = Functions::builtin();
        let sum_int = functions
            .lookup(&FunctionIdent::new("sum", vec![DataType::Integer]))
            .unwrap();
        let sum_float = functions
            .lookup(&FunctionIdent::new("sum", vec![DataType::Float]))
            .unwrap();

        assert_eq!(DataType::Long, sum_int.return_type);
        assert_eq!(DataType::Double, sum_float.return_type);
        assert!(sum_int.is_aggregate());
    }

    #[test]
    fn count_star() {
        let functions = Functions::builtin();
        let info = functions
            .lookup(&FunctionIdent::new("count", vec![]))
            .unwrap();
        assert_eq!(DataType::Long, info.return_type);
    }
}
