//! Rule domain models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Trigger type matching every event type.
pub const TRIGGER_ALL: &str = "all";

/// Open key/value condition map as authored in a rule file.
pub type Conditions = Map<String, Value>;

/// Rule category, selecting the evaluator a rule is dispatched to.
///
/// Unrecognized strings are kept in `Unknown` so that evaluation can
/// flag them instead of silently allowing the change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleCategory {
    Validation,
    Workflow,
    Automation,
    Notification,
    BoardConfiguration,
    Unknown(String),
}

impl RuleCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Validation => "validation",
            Self::Workflow => "workflow",
            Self::Automation => "automation",
            Self::Notification => "notification",
            Self::BoardConfiguration => "board_configuration",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for RuleCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "validation" => Self::Validation,
            "workflow" => Self::Workflow,
            "automation" => Self::Automation,
            "notification" => Self::Notification,
            "board_configuration" => Self::BoardConfiguration,
            _ => Self::Unknown(s),
        }
    }
}

impl From<&str> for RuleCategory {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RuleCategory> for String {
    fn from(category: RuleCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

/// A declarative rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: RuleCategory,
    pub trigger_type: String,
    #[serde(default)]
    pub conditions: Conditions,
    /// Advisory metadata for callers; never interpreted here.
    #[serde(default)]
    pub actions: Map<String, Value>,
    /// Only affects result ordering.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Rule {
    /// Look up a condition value by key.
    pub fn condition(&self, key: &str) -> Option<&Value> {
        self.conditions.get(key)
    }

    /// Whether this rule listens to the given event type.
    pub fn triggers_on(&self, event_type: &str) -> bool {
        self.trigger_type == event_type || self.trigger_type == TRIGGER_ALL
    }
}

/// Ordered rules plus free-form metadata, as stored for a board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// One rule judging a proposed change impermissible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    pub priority: i32,
    pub message: String,
    pub category: RuleCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RuleViolation {
    /// Create a violation for a rule, copying its id, priority and category.
    pub fn for_rule(rule: &Rule, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule.id.clone(),
            priority: rule.priority,
            message: message.into(),
            category: rule.category.clone(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Outcome of evaluating one proposed change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEvaluationResult {
    pub allowed: bool,
    pub violations: Vec<RuleViolation>,
}

impl RuleEvaluationResult {
    /// An allowed result with no violations.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            violations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_keeps_unknown() {
        let json = r#"{"id": "r1", "category": "escalation", "trigger_type": "all"}"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.category, RuleCategory::Unknown("escalation".to_string()));
        assert!(rule.enabled);
        assert_eq!(rule.priority, 0);

        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back["category"], "escalation");
    }

    #[test]
    fn test_known_categories_parse() {
        assert_eq!(RuleCategory::from("validation"), RuleCategory::Validation);
        assert_eq!(
            RuleCategory::from("board_configuration"),
            RuleCategory::BoardConfiguration
        );
        assert_eq!(RuleCategory::Workflow.to_string(), "workflow");
    }

    #[test]
    fn test_triggers_on_wildcard() {
        let rule: Rule = serde_json::from_str(
            r#"{"id": "r1", "category": "validation", "trigger_type": "all"}"#,
        )
        .unwrap();
        assert!(rule.triggers_on("task_create"));
        assert!(rule.triggers_on("anything"));
    }
}
