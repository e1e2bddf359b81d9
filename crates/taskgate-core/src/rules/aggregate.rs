//! Collection and ordering of violations.

use super::model::{Rule, RuleEvaluationResult, RuleViolation};

/// Evaluate every rule and gather all violations into a sorted result.
///
/// No early exit: each rule is judged even after another has failed.
pub fn evaluate_all<'a, I, F>(rules: I, mut evaluate: F) -> RuleEvaluationResult
where
    I: IntoIterator<Item = &'a Rule>,
    F: FnMut(&Rule) -> Option<RuleViolation>,
{
    let violations: Vec<RuleViolation> = rules
        .into_iter()
        .filter_map(|rule| evaluate(rule))
        .collect();
    into_result(violations)
}

/// Sort by descending priority and build the result.
///
/// The sort is stable, so equal priorities keep rule evaluation order.
pub fn into_result(mut violations: Vec<RuleViolation>) -> RuleEvaluationResult {
    violations.sort_by(|a, b| b.priority.cmp(&a.priority));
    RuleEvaluationResult {
        allowed: violations.is_empty(),
        violations,
    }
}
