//! Collaborator contracts and context enrichment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::model::RuleSet;
use crate::error::{GateError, GateResult, StoreError};
use crate::task::{ChangeRecord, Task, TaskEvent};

/// Source of the rule set for a board.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RulesStore: Send + Sync {
    async fn read_rules(&self, board_path: &str) -> Result<RuleSet, StoreError>;
}

/// Board-state facts a rule evaluation may need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesData {
    #[serde(default)]
    pub wip_counts: HashMap<String, i64>,
    #[serde(default)]
    pub subtask_wip_counts: HashMap<String, i64>,
    #[serde(default)]
    pub column_tasks: HashMap<String, Vec<Task>>,
    #[serde(default)]
    pub column_enter_times: HashMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub board_metadata: HashMap<String, Value>,
    #[serde(default)]
    pub hierarchy_map: HashMap<String, Vec<String>>,
}

/// Read access to the current state of a board.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardStateProvider: Send + Sync {
    /// Facts scoped to one task and the columns it touches.
    async fn get_rules_data(
        &self,
        task_id: &str,
        target_columns: &[String],
    ) -> Result<RulesData, StoreError>;

    /// Direct children of a task.
    async fn get_subtasks(&self, task_id: &str) -> Result<Vec<Task>, StoreError>;

    /// Chronological change records of a task.
    async fn get_task_history(&self, _task_id: &str) -> Result<Vec<ChangeRecord>, StoreError> {
        Ok(Vec::new())
    }
}

/// An event plus the board-state facts computed for it.
///
/// Built once per task evaluation and dropped afterwards.
#[derive(Debug, Clone)]
pub struct EnrichedContext {
    pub event: TaskEvent,
    pub wip_counts: HashMap<String, i64>,
    pub subtask_wip_counts: HashMap<String, i64>,
    pub task_history: Vec<ChangeRecord>,
    pub subtasks: Vec<Task>,
    pub column_tasks: HashMap<String, Vec<Task>>,
    pub column_enter_times: HashMap<String, DateTime<Utc>>,
    pub board_metadata: HashMap<String, Value>,
    pub hierarchy_map: HashMap<String, Vec<String>>,
}

impl EnrichedContext {
    /// A context with no board facts, only the event.
    pub fn bare(event: TaskEvent) -> Self {
        Self::from_parts(event, RulesData::default(), Vec::new(), Vec::new())
    }

    pub fn from_parts(
        event: TaskEvent,
        data: RulesData,
        subtasks: Vec<Task>,
        task_history: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            event,
            wip_counts: data.wip_counts,
            subtask_wip_counts: data.subtask_wip_counts,
            task_history,
            subtasks,
            column_tasks: data.column_tasks,
            column_enter_times: data.column_enter_times,
            board_metadata: data.board_metadata,
            hierarchy_map: data.hierarchy_map,
        }
    }
}

/// Columns the event touches: the destination, then the origin if different.
pub fn target_columns(event: &TaskEvent) -> Vec<String> {
    let mut columns = vec![event.future_state.status.column.clone()];
    if let Some(current) = &event.current_state {
        if !columns.contains(&current.status.column) {
            columns.push(current.status.column.clone());
        }
    }
    columns
}

/// Query the board-state provider and assemble the context for `event`.
pub async fn build_context(
    provider: &dyn BoardStateProvider,
    event: &TaskEvent,
) -> GateResult<EnrichedContext> {
    let task_id = event.future_state.task.id.clone();
    let columns = target_columns(event);

    let enrichment = |step: &'static str| {
        let task_id = task_id.clone();
        move |source: StoreError| GateError::Enrichment {
            task_id,
            step,
            source,
        }
    };

    let mut data = provider
        .get_rules_data(&task_id, &columns)
        .await
        .map_err(enrichment("rules data"))?;
    data.column_tasks.retain(|column, _| columns.contains(column));

    let (subtasks, history) = if task_id.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let subtasks = provider
            .get_subtasks(&task_id)
            .await
            .map_err(enrichment("subtasks"))?;
        let history = provider
            .get_task_history(&task_id)
            .await
            .map_err(enrichment("history"))?;
        (subtasks, history)
    };

    debug!(
        task_id = %task_id,
        columns = ?columns,
        subtasks = subtasks.len(),
        history = history.len(),
        "Context enriched"
    );

    Ok(EnrichedContext::from_parts(event.clone(), data, subtasks, history))
}
