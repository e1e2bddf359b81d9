//! Rule evaluation facade.

use std::sync::Arc;
use tracing::{debug, info};

use super::aggregate::evaluate_all;
use super::board::{builtin_rules, evaluate_board_rule};
use super::context::{build_context, BoardStateProvider, RulesStore};
use super::evaluator::evaluate_rule;
use super::filter::{applicable_rules, applicable_rules_in_category};
use super::model::{RuleCategory, RuleEvaluationResult};
use crate::board::BoardConfigurationEvent;
use crate::error::{GateError, GateResult};
use crate::task::TaskEvent;

/// Decides whether proposed task and board changes are permitted.
///
/// Holds only read-only collaborator handles, so one instance can serve
/// any number of concurrent evaluations.
#[derive(Clone)]
pub struct RuleEvaluationService {
    rules_store: Arc<dyn RulesStore>,
    board_state: Arc<dyn BoardStateProvider>,
}

impl RuleEvaluationService {
    pub fn new(rules_store: Arc<dyn RulesStore>, board_state: Arc<dyn BoardStateProvider>) -> Self {
        Self {
            rules_store,
            board_state,
        }
    }

    /// Evaluate a proposed task change against the rules stored for a board.
    ///
    /// Board state is only fetched when at least one rule applies.
    pub async fn evaluate_task_change(
        &self,
        event: &TaskEvent,
        board_path: &str,
    ) -> GateResult<RuleEvaluationResult> {
        let rule_set = self
            .rules_store
            .read_rules(board_path)
            .await
            .map_err(|source| GateError::ReadRules {
                board_path: board_path.to_string(),
                source,
            })?;

        let applicable = applicable_rules(&rule_set.rules, &event.event_type);
        if applicable.is_empty() {
            debug!(
                board_path = %board_path,
                event_type = %event.event_type,
                "No applicable rules"
            );
            return Ok(RuleEvaluationResult::allow());
        }

        let ctx = build_context(self.board_state.as_ref(), event).await?;
        let result = evaluate_all(applicable.iter().copied(), |rule| evaluate_rule(rule, &ctx));

        info!(
            board_path = %board_path,
            event_type = %event.event_type,
            task_id = %event.future_state.task.id,
            rules = applicable.len(),
            violations = result.violations.len(),
            allowed = result.allowed,
            "Task change evaluated"
        );
        Ok(result)
    }

    /// Evaluate a proposed board configuration against the built-in rules.
    pub async fn evaluate_board_configuration_change(
        &self,
        event: &BoardConfigurationEvent,
    ) -> GateResult<RuleEvaluationResult> {
        let configuration = event
            .configuration
            .as_ref()
            .ok_or(GateError::MissingConfiguration)?;

        let rules = builtin_rules();
        let applicable = applicable_rules_in_category(
            &rules,
            &event.event_type,
            &RuleCategory::BoardConfiguration,
        );
        let result = evaluate_all(applicable.iter().copied(), |rule| {
            evaluate_board_rule(rule, Some(configuration))
        });

        info!(
            event_type = %event.event_type,
            rules = applicable.len(),
            violations = result.violations.len(),
            allowed = result.allowed,
            "Board configuration change evaluated"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardConfiguration;
    use crate::error::StoreError;
    use crate::rules::context::{MockBoardStateProvider, MockRulesStore, RulesData};
    use crate::rules::model::{Rule, RuleSet};
    use crate::task::{Task, TaskState, WorkflowStatus};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn rule(id: &str, category: &str, trigger: &str, priority: i32, conditions: Value) -> Rule {
        serde_json::from_value(json!({
            "id": id,
            "name": id,
            "category": category,
            "trigger_type": trigger,
            "conditions": conditions,
            "priority": priority,
        }))
        .unwrap()
    }

    fn event(from: Option<&str>, to: &str, title: &str, description: &str) -> TaskEvent {
        let state = |column: &str| TaskState {
            task: Task {
                id: "t1".to_string(),
                title: title.to_string(),
                description: description.to_string(),
                ..Task::default()
            },
            priority: Some("high".to_string()),
            status: WorkflowStatus::in_column(column),
        };
        TaskEvent {
            event_type: if from.is_some() { "task_transition" } else { "task_create" }
                .to_string(),
            current_state: from.map(state),
            future_state: state(to),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
            parent_task: None,
            affected_subtasks: vec![],
        }
    }

    fn store_with(rules: Vec<Rule>) -> MockRulesStore {
        let mut store = MockRulesStore::new();
        store.expect_read_rules().returning(move |_| {
            Ok(RuleSet {
                rules: rules.clone(),
                ..RuleSet::default()
            })
        });
        store
    }

    fn provider_with(data: RulesData) -> MockBoardStateProvider {
        let mut provider = MockBoardStateProvider::new();
        provider
            .expect_get_rules_data()
            .returning(move |_, _| Ok(data.clone()));
        provider.expect_get_subtasks().returning(|_| Ok(vec![]));
        provider.expect_get_task_history().returning(|_| Ok(vec![]));
        provider
    }

    fn service(store: MockRulesStore, provider: MockBoardStateProvider) -> RuleEvaluationService {
        RuleEvaluationService::new(Arc::new(store), Arc::new(provider))
    }

    fn board_event(title: &str) -> BoardConfigurationEvent {
        BoardConfigurationEvent {
            event_type: "board_create".to_string(),
            configuration: Some(BoardConfiguration {
                title: title.to_string(),
                description: None,
                metadata: None,
            }),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_no_applicable_rules_skips_enrichment() {
        let mut disabled = rule("off", "validation", "all", 1, json!({"max_wip_limit": 0}));
        disabled.enabled = false;
        let store = store_with(vec![
            disabled,
            rule("other", "validation", "task_update", 1, json!({"max_wip_limit": 0})),
        ]);
        let mut provider = MockBoardStateProvider::new();
        provider.expect_get_rules_data().never();

        let result = service(store, provider)
            .evaluate_task_change(&event(None, "todo", "", ""), "boards/main")
            .await
            .unwrap();
        assert!(result.allowed);
        assert!(result.violations.is_empty());
    }

    #[tokio::test]
    async fn test_empty_rule_set_allows() {
        let mut provider = MockBoardStateProvider::new();
        provider.expect_get_rules_data().never();

        let result = service(store_with(vec![]), provider)
            .evaluate_task_change(&event(Some("todo"), "done", "", ""), "boards/main")
            .await
            .unwrap();
        assert_eq!(result, RuleEvaluationResult::allow());
    }

    #[tokio::test]
    async fn test_store_error_is_fatal() {
        let mut store = MockRulesStore::new();
        store
            .expect_read_rules()
            .withf(|path| path == "boards/main")
            .returning(|_| Err(StoreError::NotFound("boards/main".to_string())));
        let mut provider = MockBoardStateProvider::new();
        provider.expect_get_rules_data().never();

        let err = service(store, provider)
            .evaluate_task_change(&event(None, "todo", "T", "D"), "boards/main")
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::ReadRules { ref board_path, .. } if board_path == "boards/main"));
    }

    #[tokio::test]
    async fn test_enrichment_error_is_fatal_when_rules_apply() {
        let store = store_with(vec![rule("wip", "validation", "all", 1, json!({"max_wip_limit": 3}))]);
        let mut provider = MockBoardStateProvider::new();
        provider
            .expect_get_rules_data()
            .returning(|_, _| Err(StoreError::backend("unreadable board")));

        let err = service(store, provider)
            .evaluate_task_change(&event(Some("todo"), "doing", "T", "D"), "boards/main")
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Enrichment { .. }));
    }

    #[tokio::test]
    async fn test_wip_boundary() {
        let rules = vec![rule("wip", "validation", "all", 5, json!({"max_wip_limit": 2}))];
        let mut data = RulesData::default();
        data.wip_counts.insert("doing".to_string(), 2);

        let svc = service(store_with(rules.clone()), provider_with(data.clone()));
        let blocked = svc
            .evaluate_task_change(&event(Some("todo"), "doing", "T", "D"), "b")
            .await
            .unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.violations[0].rule_id, "wip");

        let svc = service(store_with(rules), provider_with(data));
        let stay = svc
            .evaluate_task_change(&event(Some("doing"), "doing", "T", "D"), "b")
            .await
            .unwrap();
        assert!(stay.allowed);
    }

    #[tokio::test]
    async fn test_transition_boundary() {
        let rules = vec![rule(
            "flow",
            "workflow",
            "task_transition",
            1,
            json!({"allowed_transitions": ["todo->doing", "doing->done"]}),
        )];
        let svc = service(store_with(rules), provider_with(RulesData::default()));

        let skip = svc
            .evaluate_task_change(&event(Some("todo"), "done", "T", "D"), "b")
            .await
            .unwrap();
        assert!(!skip.allowed);

        let step = svc
            .evaluate_task_change(&event(Some("todo"), "doing", "T", "D"), "b")
            .await
            .unwrap();
        assert!(step.allowed);

        let same = svc
            .evaluate_task_change(&event(Some("review"), "review", "T", "D"), "b")
            .await
            .unwrap();
        assert!(same.allowed);
    }

    #[tokio::test]
    async fn test_multiple_violations_sorted_by_priority() {
        let rules = vec![
            rule("desc", "validation", "all", 50, json!({"required_fields": ["description"]})),
            rule("title", "validation", "all", 100, json!({"required_fields": ["title"]})),
        ];
        let result = service(store_with(rules), provider_with(RulesData::default()))
            .evaluate_task_change(&event(None, "todo", "", ""), "b")
            .await
            .unwrap();

        assert!(!result.allowed);
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[0].rule_id, "title");
        assert_eq!(result.violations[0].priority, 100);
        assert_eq!(result.violations[1].rule_id, "desc");
    }

    #[tokio::test]
    async fn test_all_violated_rules_reported_deterministically() {
        let rules = vec![
            rule("a", "validation", "all", 1, json!({"required_fields": ["title"]})),
            rule("b", "mystery", "all", 7, json!({})),
            rule("c", "validation", "all", 1, json!({"max_wip_limit": "nope"})),
            rule("d", "notification", "all", 9, json!({})),
            rule("e", "workflow", "all", 3, json!({"allowed_transitions": {}})),
        ];
        let svc = service(store_with(rules), provider_with(RulesData::default()));
        let ev = event(Some("todo"), "doing", " ", "D");

        let first = svc.evaluate_task_change(&ev, "b").await.unwrap();
        let second = svc.evaluate_task_change(&ev, "b").await.unwrap();
        assert_eq!(first, second);

        let ids: Vec<&str> = first.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "a", "c"]);
        assert!(first
            .violations
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority));
    }

    #[tokio::test]
    async fn test_board_title_rules() {
        let svc = service(MockRulesStore::new(), MockBoardStateProvider::new());

        let empty = svc
            .evaluate_board_configuration_change(&board_event(""))
            .await
            .unwrap();
        assert!(!empty.allowed);
        assert!(empty.violations[0].message.contains("required"));

        let exact = svc
            .evaluate_board_configuration_change(&board_event(&"x".repeat(100)))
            .await
            .unwrap();
        assert!(exact.allowed);

        let long = svc
            .evaluate_board_configuration_change(&board_event(&"x".repeat(101)))
            .await
            .unwrap();
        assert_eq!(long.violations.len(), 1);

        let symbols = svc
            .evaluate_board_configuration_change(&board_event("Board@#"))
            .await
            .unwrap();
        assert_eq!(symbols.violations.len(), 1);
        assert!(symbols.violations[0].message.contains("'@'"));
    }

    #[tokio::test]
    async fn test_board_whitespace_title_flagged_by_title_rule_only() {
        let svc = service(MockRulesStore::new(), MockBoardStateProvider::new());
        let result = svc
            .evaluate_board_configuration_change(&board_event("   "))
            .await
            .unwrap();

        assert!(!result.allowed);
        let ids: Vec<&str> = result.violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["board_title_validation"]);
        assert_eq!(result.violations[0].message, "Board title is required");
    }

    #[tokio::test]
    async fn test_board_missing_configuration_is_error() {
        let svc = service(MockRulesStore::new(), MockBoardStateProvider::new());
        let mut ev = board_event("Board");
        ev.configuration = None;
        let err = svc.evaluate_board_configuration_change(&ev).await.unwrap_err();
        assert!(matches!(err, GateError::MissingConfiguration));
    }
}
