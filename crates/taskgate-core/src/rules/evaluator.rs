//! Per-rule evaluation of task changes.
//!
//! Each rule yields at most one violation. Rules are dispatched on their
//! category; a malformed condition value is reported as a violation of
//! that rule and never aborts the evaluation of other rules.

use chrono::TimeDelta;
use serde_json::Value;
use tracing::{debug, warn};

use super::context::EnrichedContext;
use super::model::{Rule, RuleCategory, RuleViolation};
use super::value::{parse_int, string_list};

/// Condition keys read by validation rules.
pub const MAX_WIP_LIMIT: &str = "max_wip_limit";
pub const MAX_SUBTASK_WIP_LIMIT: &str = "max_subtask_wip_limit";
pub const REQUIRED_FIELDS: &str = "required_fields";
/// Condition key read by workflow rules.
pub const ALLOWED_TRANSITIONS: &str = "allowed_transitions";
/// Condition key read by automation rules.
pub const MAX_AGE_DAYS: &str = "max_age_days";

/// Evaluate one rule against an enriched context.
pub fn evaluate_rule(rule: &Rule, ctx: &EnrichedContext) -> Option<RuleViolation> {
    match &rule.category {
        RuleCategory::Validation => evaluate_validation(rule, ctx),
        RuleCategory::Workflow => evaluate_workflow(rule, ctx),
        RuleCategory::Automation => evaluate_automation(rule, ctx),
        RuleCategory::Notification => None,
        RuleCategory::BoardConfiguration => {
            warn!(
                rule_id = %rule.id,
                event_type = %ctx.event.event_type,
                "Board configuration rule reached task evaluation, skipping"
            );
            None
        }
        RuleCategory::Unknown(name) => Some(RuleViolation::for_rule(
            rule,
            format!("Unknown rule category: {}", name),
        )),
    }
}

fn invalid_value(rule: &Rule, key: &str, value: &Value) -> RuleViolation {
    RuleViolation::for_rule(rule, format!("Invalid {} value: {}", key, value))
}

fn evaluate_validation(rule: &Rule, ctx: &EnrichedContext) -> Option<RuleViolation> {
    let event = &ctx.event;
    let future = &event.future_state;
    let target = &future.status.column;
    let is_subtask = future.task.is_subtask();

    if let Some(raw) = rule.condition(MAX_WIP_LIMIT).filter(|_| !is_subtask) {
        let limit = match parse_int(raw) {
            Ok(limit) => limit,
            Err(_) => return Some(invalid_value(rule, MAX_WIP_LIMIT, raw)),
        };
        let current = ctx.wip_counts.get(target).copied().unwrap_or(0);
        if event.is_entering_column() && current >= limit {
            return Some(
                RuleViolation::for_rule(
                    rule,
                    format!("WIP limit exceeded for column '{}'", target),
                )
                .with_details(format!("Current WIP: {}, Limit: {}", current, limit)),
            );
        }
    }

    if let Some(raw) = rule.condition(MAX_SUBTASK_WIP_LIMIT).filter(|_| is_subtask) {
        let limit = match parse_int(raw) {
            Ok(limit) => limit,
            Err(_) => return Some(invalid_value(rule, MAX_SUBTASK_WIP_LIMIT, raw)),
        };
        let current = ctx.subtask_wip_counts.get(target).copied().unwrap_or(0);
        if event.is_entering_column() && current >= limit {
            return Some(
                RuleViolation::for_rule(
                    rule,
                    format!("Subtask WIP limit exceeded for column '{}'", target),
                )
                .with_details(format!("Current subtask WIP: {}, Limit: {}", current, limit)),
            );
        }
    }

    if let Some(raw) = rule.condition(REQUIRED_FIELDS) {
        let Some(fields) = string_list(raw) else {
            return Some(invalid_value(rule, REQUIRED_FIELDS, raw));
        };
        for field in fields {
            let value = match field {
                "title" => &future.task.title,
                "description" => &future.task.description,
                other => {
                    debug!(rule_id = %rule.id, field = other, "Unsupported required field");
                    continue;
                }
            };
            if value.trim().is_empty() {
                return Some(RuleViolation::for_rule(
                    rule,
                    format!("Required field '{}' is missing", field),
                ));
            }
        }
    }

    None
}

fn evaluate_workflow(rule: &Rule, ctx: &EnrichedContext) -> Option<RuleViolation> {
    let event = &ctx.event;
    let current = event.current_state.as_ref()?;
    let from = &current.status.column;
    let to = &event.future_state.status.column;
    if from == to {
        return None;
    }

    let allowed = rule.condition(ALLOWED_TRANSITIONS)?;
    let permitted = match allowed {
        Value::Array(_) => {
            let pair = format!("{}->{}", from, to);
            string_list(allowed).is_some_and(|pairs| pairs.contains(&pair.as_str()))
        }
        Value::Object(map) => map
            .get(from)
            .and_then(string_list)
            .is_some_and(|targets| targets.contains(&to.as_str())),
        other => return Some(invalid_value(rule, ALLOWED_TRANSITIONS, other)),
    };

    if permitted {
        None
    } else {
        Some(RuleViolation::for_rule(
            rule,
            format!("Transition from '{}' to '{}' is not allowed", from, to),
        ))
    }
}

fn evaluate_automation(rule: &Rule, ctx: &EnrichedContext) -> Option<RuleViolation> {
    let raw = rule.condition(MAX_AGE_DAYS)?;
    let max_days = match parse_int(raw) {
        Ok(days) => days,
        Err(_) => return Some(invalid_value(rule, MAX_AGE_DAYS, raw)),
    };

    let event = &ctx.event;
    let column = &event.current_state.as_ref()?.status.column;
    // No known entry time: nothing to measure against.
    let entered = ctx.column_enter_times.get(column)?;

    let age = event.timestamp.signed_duration_since(*entered);
    let limit = TimeDelta::try_days(max_days)?;
    if age > limit {
        Some(
            RuleViolation::for_rule(
                rule,
                format!(
                    "Task has been in column '{}' for {} days, exceeding the limit of {} days",
                    column,
                    age.num_days(),
                    max_days
                ),
            )
            .with_details(format!("Age: {}h, Limit: {}h", age.num_hours(), limit.num_hours())),
        )
    } else {
        None
    }
}
