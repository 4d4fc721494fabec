use tracing::trace;

use super::{FilterProjection, GroupProjection, TopNProjection};
use crate::analyze::query_spec::{OrderBy, OrderByExpr, QuerySpec};
use crate::errors::{Result, internal};
use crate::symbol::{Aggregation, AggregationStep, Symbol, format_symbols};
use crate::types::DataType;

/// Where a query gets split between the collect and merge phases.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPoints {
    /// Symbols read at the collect phase. Group keys first, followed by the
    /// (non-literal) aggregate arguments.
    pub leaves: Vec<Symbol>,
    /// Unsplit aggregate calls found in the outputs, having and order by.
    pub aggregates: Vec<Symbol>,
}

/// Builds projections for a single query.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionBuilder<'a> {
    query_spec: &'a QuerySpec,
}

impl<'a> ProjectionBuilder<'a> {
    pub fn new(query_spec: &'a QuerySpec) -> Self {
        ProjectionBuilder { query_spec }
    }

    pub fn split_points(&self) -> SplitPoints {
        let spec = self.query_spec;

        let mut aggregates: Vec<Symbol> = Vec::new();
        let mut collect_aggregates = |sym: &Symbol| {
            sym.walk(&mut |child| {
                if child.is_aggregate() {
                    if !aggregates.contains(child) {
                        aggregates.push(child.clone());
                    }
                    return false;
                }
                true
            })
        };
        spec.outputs.iter().for_each(&mut collect_aggregates);
        if let Some(query) = spec.having.as_ref().and_then(|h| h.query.as_ref()) {
            collect_aggregates(query);
        }
        if let Some(order_by) = &spec.order_by {
            order_by.symbols().for_each(&mut collect_aggregates);
        }

        let mut leaves: Vec<Symbol> = Vec::new();
        let mut push_leaf = |sym: &Symbol| {
            if !sym.is_literal() && !leaves.contains(sym) {
                leaves.push(sym.clone());
            }
        };

        match &spec.group_by {
            Some(group_by) => group_by.iter().for_each(&mut push_leaf),
            None if aggregates.is_empty() => spec.outputs.iter().for_each(&mut push_leaf),
            None => (),
        }
        for aggregate in &aggregates {
            aggregate.children().into_iter().for_each(&mut push_leaf);
        }

        trace!(
            leaves = %format_symbols(&leaves),
            aggregates = %format_symbols(&aggregates),
            "computed split points"
        );

        SplitPoints { leaves, aggregates }
    }

    /// Build a group projection over `inputs`.
    ///
    /// Aggregations starting at `Iter` read their arguments from the inputs.
    /// Aggregations starting at a later step read the state emitted for the
    /// same aggregate by the previous phase.
    pub fn group_projection(
        &self,
        inputs: &[Symbol],
        keys: &[Symbol],
        aggregates: &[Symbol],
        from_step: AggregationStep,
        to_step: AggregationStep,
    ) -> Result<GroupProjection> {
        let keys = keys
            .iter()
            .map(|key| resolve_against(inputs, key))
            .collect::<Result<Vec<_>>>()?;

        let values = aggregates
            .iter()
            .map(|aggregate| {
                let function = match aggregate {
                    Symbol::Function(function) if function.info.is_aggregate() => function,
                    other => return Err(internal!("Expected aggregate, got '{other}'")),
                };

                let agg_inputs = match from_step {
                    AggregationStep::Iter => function
                        .value_arguments()
                        .map(|arg| resolve_against(inputs, arg))
                        .collect::<Result<Vec<_>>>()?,
                    AggregationStep::Partial | AggregationStep::Final => {
                        let idx = inputs
                            .iter()
                            .position(|input| input == aggregate)
                            .ok_or_else(|| {
                                internal!("Missing {from_step} state for '{aggregate}'")
                            })?;
                        vec![Symbol::input_column(idx, DataType::Undefined)]
                    }
                };

                Ok(Aggregation {
                    info: function.info.clone(),
                    inputs: agg_inputs,
                    from_step,
                    to_step,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GroupProjection {
            keys,
            values,
            from_step,
            to_step,
        })
    }

    pub fn filter_projection(&self, inputs: &[Symbol], predicate: &Symbol) -> Result<FilterProjection> {
        Ok(FilterProjection {
            query: resolve_against(inputs, predicate)?,
            outputs: passthrough(inputs),
        })
    }

    /// Build a top-n projection over `inputs`.
    ///
    /// Emits all inputs unless `output_remap` selects the outputs.
    pub fn top_n_projection(
        &self,
        inputs: &[Symbol],
        order_by: Option<&OrderBy>,
        offset: u64,
        limit: Option<u64>,
        output_remap: Option<&[Symbol]>,
    ) -> Result<TopNProjection> {
        let order_by = match order_by {
            Some(order_by) => order_by
                .exprs
                .iter()
                .map(|expr| {
                    Ok(OrderByExpr {
                        expr: resolve_against(inputs, &expr.expr)?,
                        asc: expr.asc,
                        nulls_first: expr.nulls_first,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let outputs = match output_remap {
            Some(outputs) => outputs
                .iter()
                .map(|output| resolve_against(inputs, output))
                .collect::<Result<Vec<_>>>()?,
            None => passthrough(inputs),
        };

        Ok(TopNProjection {
            order_by,
            offset,
            limit,
            outputs,
        })
    }
}

/// Replace every part of `symbol` that's produced by the previous stage with
/// a pointer to that input column.
fn resolve_against(inputs: &[Symbol], symbol: &Symbol) -> Result<Symbol> {
    symbol.clone().rewrite(&mut |sym| {
        if let Some(idx) = inputs.iter().position(|input| input == sym) {
            let value_type = sym.value_type().unwrap_or(DataType::Undefined);
            return Ok(Some(Symbol::input_column(idx, value_type)));
        }

        match sym {
            Symbol::Literal(_) | Symbol::Parameter(_) => Ok(Some(sym.clone())),
            Symbol::Function(function) if !function.info.is_aggregate() => Ok(None),
            other => Err(internal!(
                "'{other}' not available in projection inputs [{}]",
                format_symbols(inputs)
            )),
        }
    })
}

fn passthrough(inputs: &[Symbol]) -> Vec<Symbol> {
    inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            Symbol::input_column(idx, input.value_type().unwrap_or(DataType::Undefined))
        })
        .collect()
}
