//! Rule evaluation engine.
//!
//! Rules come from a per-board store (task rules) or a compiled-in table
//! (board configuration rules). A single evaluation filters the applicable
//! rules, enriches the event with board state when needed, judges every
//! rule and returns all violations ordered by descending priority.

pub mod aggregate;
pub mod board;
pub mod context;
pub mod evaluator;
pub mod filter;
pub mod model;
pub mod service;
pub mod value;

pub use context::{BoardStateProvider, EnrichedContext, RulesData, RulesStore};
pub use model::{
    Conditions, Rule, RuleCategory, RuleEvaluationResult, RuleSet, RuleViolation, TRIGGER_ALL,
};
pub use service::RuleEvaluationService;
pub use value::ValueParseError;
