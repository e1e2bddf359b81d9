//! Selection of the rules applicable to an event.

use super::model::{Rule, RuleCategory};

/// Rules that are enabled and triggered by `event_type`, in input order.
pub fn applicable_rules<'a>(rules: &'a [Rule], event_type: &str) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|rule| rule.enabled && rule.triggers_on(event_type))
        .collect()
}

/// Like [`applicable_rules`], further restricted to one category.
pub fn applicable_rules_in_category<'a>(
    rules: &'a [Rule],
    event_type: &str,
    category: &RuleCategory,
) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|rule| rule.enabled && rule.triggers_on(event_type) && &rule.category == category)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::model::TRIGGER_ALL;
    use serde_json::Map;

    fn rule(id: &str, category: RuleCategory, trigger: &str, enabled: bool) -> Rule {
        Rule {
            id: id.to_string(),
            name: id.to_string(),
            category,
            trigger_type: trigger.to_string(),
            conditions: Map::new(),
            actions: Map::new(),
            priority: 0,
            enabled,
        }
    }

    #[test]
    fn test_filters_by_trigger_and_enabled() {
        let rules = vec![
            rule("a", RuleCategory::Validation, "task_create", true),
            rule("b", RuleCategory::Validation, "task_update", true),
            rule("c", RuleCategory::Workflow, TRIGGER_ALL, true),
            rule("d", RuleCategory::Validation, "task_create", false),
        ];
        let ids: Vec<&str> = applicable_rules(&rules, "task_create")
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let rules = vec![rule("a", RuleCategory::Validation, "task_create", false)];
        assert!(applicable_rules(&rules, "task_create").is_empty());
        assert!(applicable_rules(&[], "task_create").is_empty());
    }

    #[test]
    fn test_category_restriction() {
        let rules = vec![
            rule("a", RuleCategory::Validation, TRIGGER_ALL, true),
            rule("b", RuleCategory::BoardConfiguration, TRIGGER_ALL, true),
            rule("c", RuleCategory::BoardConfiguration, "board_update", true),
        ];
        let ids: Vec<&str> =
            applicable_rules_in_category(&rules, "board_create", &RuleCategory::BoardConfiguration)
                .iter()
                .map(|r| r.id.as_str())
                .collect();
        assert_eq!(ids, vec!["b"]);
    }
}
