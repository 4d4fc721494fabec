//! Analyzed statement shapes handed to the planner, and the analysis steps
//! that reconcile symbol types.

pub mod coercion;
pub mod insert;
pub mod query_spec;
pub mod relation;
