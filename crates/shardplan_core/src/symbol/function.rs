use std::fmt;

use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::types::DataType;

/// Name of the dynamically resolved cast function.
pub const CAST_FUNCTION_NAME: &str = "cast";

/// Identity of a function, a name and the argument types it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionIdent {
    pub name: String,
    pub argument_types: Vec<DataType>,
}

impl FunctionIdent {
    pub fn new(name: impl Into<String>, argument_types: Vec<DataType>) -> Self {
        FunctionIdent {
            name: name.into(),
            argument_types,
        }
    }
}

impl fmt::Display for FunctionIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (idx, typ) in self.argument_types.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{typ}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Scalar,
    Aggregate,
}

/// Resolved function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub ident: FunctionIdent,
    pub return_type: DataType,
    pub kind: FunctionKind,
}

impl FunctionInfo {
    pub fn is_aggregate(&self) -> bool {
        self.kind == FunctionKind::Aggregate
    }
}

/// Argument to a function call.
///
/// Some signatures take a type as a parameter (e.g. the target type of a
/// cast). Those positions carry a type tag instead of a runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionArgument {
    Value(Symbol),
    TypeTag(DataType),
}

impl FunctionArgument {
    pub fn as_value(&self) -> Option<&Symbol> {
        match self {
            Self::Value(sym) => Some(sym),
            Self::TypeTag(_) => None,
        }
    }
}

impl From<Symbol> for FunctionArgument {
    fn from(value: Symbol) -> Self {
        FunctionArgument::Value(value)
    }
}

/// A scalar function or an (unsplit) aggregate function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub info: FunctionInfo,
    pub arguments: Vec<FunctionArgument>,
}

impl Function {
    pub fn new(info: FunctionInfo, arguments: Vec<FunctionArgument>) -> Self {
        Function { info, arguments }
    }

    pub fn is_cast(&self) -> bool {
        self.info.ident.name == CAST_FUNCTION_NAME
    }

    /// Iterate the arguments holding runtime values, skipping type tags.
    pub fn value_arguments(&self) -> impl Iterator<Item = &Symbol> {
        self.arguments.iter().filter_map(FunctionArgument::as_value)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cast() {
            let mut values = self.value_arguments();
            if let Some(value) = values.next() {
                return write!(f, "cast({value} AS {})", self.info.return_type);
            }
        }

        if let Some(op) = self.info.ident.name.strip_prefix("op_") {
            let values: Vec<_> = self.value_arguments().collect();
            match values.as_slice() {
                [operand] => return write!(f, "({op} {operand})"),
                [left, right] => return write!(f, "({left} {op} {right})"),
                _ => (),
            }
        }

        write!(f, "{}(", self.info.ident.name)?;
        for (idx, arg) in self.arguments.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            match arg {
                FunctionArgument::Value(sym) => write!(f, "{sym}")?,
                FunctionArgument::TypeTag(typ) => write!(f, "{typ}")?,
            }
        }
        write!(f, ")")
    }
}

/// Lifecycle stage of an aggregate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationStep {
    /// Raw input rows.
    Iter,
    /// Intermediate per-node state.
    Partial,
    /// Externally visible result.
    Final,
}

impl fmt::Display for AggregationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iter => write!(f, "ITER"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Final => write!(f, "FINAL"),
        }
    }
}

/// An aggregate function placed inside a group projection.
///
/// Inputs always refer to columns of the projection's input rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub info: FunctionInfo,
    pub inputs: Vec<Symbol>,
    pub from_step: AggregationStep,
    pub to_step: AggregationStep,
}

impl Aggregation {
    /// Partial states are opaque, only the final step has the function's
    /// declared return type.
    pub fn value_type(&self) -> DataType {
        match self.to_step {
            AggregationStep::Final => self.info.return_type.clone(),
            AggregationStep::Iter | AggregationStep::Partial => DataType::Undefined,
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.info.ident.name)?;
        for (idx, input) in self.inputs.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{input}")?;
        }
        write!(f, ")")
    }
}
