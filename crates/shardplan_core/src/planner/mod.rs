//! Physical planning of analyzed relations.

pub mod consumer;
pub mod context;
pub mod node;
pub mod plan;
pub mod projection;
