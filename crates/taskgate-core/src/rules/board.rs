//! Built-in board configuration rules.
//!
//! These rules are compiled in rather than read from a rules store, so
//! board metadata validation never depends on task rule storage.

use serde_json::{Map, Value};

use super::model::{Rule, RuleCategory, RuleViolation, TRIGGER_ALL};
use super::value::flag;
use crate::board::BoardConfiguration;

pub const VALIDATE_TITLE: &str = "validate_title";
pub const VALIDATE_DESCRIPTION: &str = "validate_description";
pub const VALIDATE_FORMAT: &str = "validate_format";

/// Maximum board title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 100;
/// Maximum board description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// (id, name, condition flag, priority)
const BUILTIN_RULES: &[(&str, &str, &str, i32)] = &[
    ("board_title_validation", "Board title validation", VALIDATE_TITLE, 100),
    (
        "board_description_validation",
        "Board description validation",
        VALIDATE_DESCRIPTION,
        90,
    ),
    ("board_format_validation", "Board format validation", VALIDATE_FORMAT, 80),
];

/// The fixed rule set applied to board configuration changes.
pub fn builtin_rules() -> Vec<Rule> {
    BUILTIN_RULES
        .iter()
        .map(|(id, name, condition, priority)| {
            let mut conditions = Map::new();
            conditions.insert(condition.to_string(), Value::Bool(true));
            Rule {
                id: id.to_string(),
                name: name.to_string(),
                category: RuleCategory::BoardConfiguration,
                trigger_type: TRIGGER_ALL.to_string(),
                conditions,
                actions: Map::new(),
                priority: *priority,
                enabled: true,
            }
        })
        .collect()
}

/// Message and optional details of a failed check.
type CheckOutcome = Option<(String, Option<String>)>;

/// Evaluate one board configuration rule. Each enabled check flag runs in
/// turn; the first failing check is reported.
pub fn evaluate_board_rule(
    rule: &Rule,
    configuration: Option<&BoardConfiguration>,
) -> Option<RuleViolation> {
    let checks: [(&str, fn(Option<&BoardConfiguration>) -> CheckOutcome); 3] = [
        (VALIDATE_TITLE, check_title),
        (VALIDATE_DESCRIPTION, check_description),
        (VALIDATE_FORMAT, check_format),
    ];

    checks
        .iter()
        .filter(|(key, _)| flag(rule.condition(key)))
        .find_map(|(_, check)| check(configuration))
        .map(|(message, details)| {
            let violation = RuleViolation::for_rule(rule, message);
            match details {
                Some(details) => violation.with_details(details),
                None => violation,
            }
        })
}

fn check_title(configuration: Option<&BoardConfiguration>) -> CheckOutcome {
    let title = configuration?.title.trim();
    if title.is_empty() {
        return Some(("Board title is required".to_string(), None));
    }

    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Some((
            format!("Board title must be at most {} characters", MAX_TITLE_LENGTH),
            Some(format!("Length: {}, Limit: {}", length, MAX_TITLE_LENGTH)),
        ));
    }

    title
        .chars()
        .enumerate()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == ' ' || *c == '-'))
        .map(|(position, c)| {
            (
                format!(
                    "Board title contains invalid character '{}' at position {}",
                    c, position
                ),
                Some("Allowed: letters, digits, spaces and hyphens".to_string()),
            )
        })
}

fn check_description(configuration: Option<&BoardConfiguration>) -> CheckOutcome {
    let description = configuration?.description.as_deref()?.trim();
    let length = description.chars().count();
    if length > MAX_DESCRIPTION_LENGTH {
        return Some((
            format!(
                "Board description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            ),
            Some(format!("Length: {}, Limit: {}", length, MAX_DESCRIPTION_LENGTH)),
        ));
    }
    None
}

fn check_format(configuration: Option<&BoardConfiguration>) -> CheckOutcome {
    let Some(configuration) = configuration else {
        return Some(("Board configuration is required".to_string(), None));
    };
    if configuration.title.is_empty() {
        return Some(("Board title is required in configuration".to_string(), None));
    }

    let metadata = configuration.metadata.as_ref()?;
    metadata.iter().find_map(|(key, value)| {
        if key.trim().is_empty() {
            Some(("Board metadata contains an empty key".to_string(), None))
        } else if value.trim().is_empty() {
            Some((format!("Board metadata value for '{}' is empty", key), None))
        } else {
            None
        }
    })
}
