//! Validation engine: run orchestration and outcome aggregation.

pub mod orchestrator;
pub mod outcome;
