//! Taskgate Core Library
//!
//! Domain models and the rule engine deciding whether task and board
//! changes are permitted.

pub mod board;
pub mod error;
pub mod rules;
pub mod task;

pub use error::{GateError, GateResult, StoreError};
pub use rules::RuleEvaluationService;
