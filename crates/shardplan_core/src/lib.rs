pub mod analyze;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod functions;
pub mod planner;
pub mod symbol;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;
