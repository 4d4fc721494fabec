//! Projections are the row transformations chained inside a plan stage.
//!
//! Every symbol held by a projection refers to its input rows through
//! `InputColumn`s, never to table columns directly.

pub mod builder;

use serde::{Deserialize, Serialize};

use crate::analyze::query_spec::OrderByExpr;
use crate::symbol::{Aggregation, AggregationStep, Symbol};
use crate::types::DataType;

/// Groups rows by keys and computes aggregates per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProjection {
    pub keys: Vec<Symbol>,
    pub values: Vec<Aggregation>,
    pub from_step: AggregationStep,
    pub to_step: AggregationStep,
}

/// Drops rows not matching the predicate. Rows are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterProjection {
    pub query: Symbol,
    pub outputs: Vec<Symbol>,
}

/// Orders rows and keeps at most `limit` rows after skipping `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopNProjection {
    pub order_by: Vec<OrderByExpr>,
    pub offset: u64,
    /// No limit if None.
    pub limit: Option<u64>,
    pub outputs: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    Group(GroupProjection),
    Filter(FilterProjection),
    TopN(TopNProjection),
}

impl Projection {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Filter(_) => "filter",
            Self::TopN(_) => "top_n",
        }
    }

    /// Types of the rows this projection emits.
    pub fn output_types(&self) -> Vec<DataType> {
        match self {
            Self::Group(group) => {
                let keys = group.keys.iter().map(symbol_type);
                let values = group.values.iter().map(Aggregation::value_type);
                keys.chain(values).collect()
            }
            Self::Filter(filter) => filter.outputs.iter().map(symbol_type).collect(),
            Self::TopN(top_n) => top_n.outputs.iter().map(symbol_type).collect(),
        }
    }

    /// Indices of all input columns referenced by this projection.
    pub fn referenced_inputs(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut collect = |sym: &Symbol| {
            sym.walk(&mut |child| {
                if let Symbol::InputColumn(col) = child {
                    indices.push(col.index);
                }
                true
            })
        };

        match self {
            Self::Group(group) => {
                group.keys.iter().for_each(&mut collect);
                group
                    .values
                    .iter()
                    .flat_map(|agg| agg.inputs.iter())
                    .for_each(&mut collect);
            }
            Self::Filter(filter) => {
                collect(&filter.query);
                filter.outputs.iter().for_each(&mut collect);
            }
            Self::TopN(top_n) => {
                top_n.order_by.iter().for_each(|expr| collect(&expr.expr));
                top_n.outputs.iter().for_each(&mut collect);
            }
        }

        indices
    }
}

impl From<GroupProjection> for Projection {
    fn from(value: GroupProjection) -> Self {
        Projection::Group(value)
    }
}

impl From<FilterProjection> for Projection {
    fn from(value: FilterProjection) -> Self {
        Projection::Filter(value)
    }
}

impl From<TopNProjection> for Projection {
    fn from(value: TopNProjection) -> Self {
        Projection::TopN(value)
    }
}

fn symbol_type(sym: &Symbol) -> DataType {
    sym.value_type().unwrap_or(DataType::Undefined)
}
