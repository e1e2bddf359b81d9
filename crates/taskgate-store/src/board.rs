//! Board state snapshots.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use taskgate_core::rules::{BoardStateProvider, RulesData};
use taskgate_core::task::{ChangeRecord, Task};
use taskgate_core::StoreError;
use tracing::debug;

use crate::rules::read_optional;

/// Snapshot file name inside a board directory.
pub const BOARD_JSON: &str = "board.json";

/// History field recording column moves.
const COLUMN_FIELD: &str = "column";

/// A task as persisted on a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTask {
    #[serde(flatten)]
    pub task: Task,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_entered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ChangeRecord>,
}

impl StoredTask {
    /// When the task entered its current column: the recorded timestamp,
    /// else the latest history move into that column.
    pub fn entered_current_column(&self) -> Option<DateTime<Utc>> {
        self.column_entered_at.or_else(|| {
            self.history
                .iter()
                .filter(|r| {
                    r.field == COLUMN_FIELD && r.new_value.as_deref() == Some(self.column.as_str())
                })
                .map(|r| r.timestamp)
                .max()
        })
    }
}

/// Full state of one board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub tasks: Vec<StoredTask>,
}

impl BoardSnapshot {
    /// Compute the rule facts for one task and the columns it touches.
    pub fn rules_data(&self, task_id: &str, target_columns: &[String]) -> RulesData {
        let mut data = RulesData {
            board_metadata: self.metadata.clone(),
            ..RulesData::default()
        };

        for column in target_columns {
            data.wip_counts.entry(column.clone()).or_insert(0);
            data.subtask_wip_counts.entry(column.clone()).or_insert(0);
            data.column_tasks.entry(column.clone()).or_default();
        }

        for stored in &self.tasks {
            let task = &stored.task;

            if let Some(parent) = task.parent_id.as_ref().filter(|_| task.is_subtask()) {
                data.hierarchy_map
                    .entry(parent.clone())
                    .or_default()
                    .push(task.id.clone());
            }

            if !target_columns.contains(&stored.column) {
                continue;
            }

            let counts = if task.is_subtask() {
                &mut data.subtask_wip_counts
            } else {
                &mut data.wip_counts
            };
            *counts.entry(stored.column.clone()).or_insert(0) += 1;

            data.column_tasks
                .entry(stored.column.clone())
                .or_default()
                .push(task.clone());

            if !task_id.is_empty() && task.id == task_id {
                if let Some(entered) = stored.entered_current_column() {
                    data.column_enter_times.insert(stored.column.clone(), entered);
                }
            }
        }

        data
    }

    /// Direct children of a task.
    pub fn subtasks(&self, task_id: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|s| s.task.parent_id.as_deref() == Some(task_id))
            .map(|s| s.task.clone())
            .collect()
    }

    /// Change records of a task, oldest first.
    pub fn history(&self, task_id: &str) -> Vec<ChangeRecord> {
        let mut history: Vec<ChangeRecord> = self
            .tasks
            .iter()
            .filter(|s| s.task.id == task_id)
            .flat_map(|s| s.history.iter().cloned())
            .collect();
        history.sort_by_key(|r| r.timestamp);
        history
    }
}

/// Board state read from a `board.json` snapshot on every call.
#[derive(Debug, Clone)]
pub struct FsBoardState {
    board_dir: PathBuf,
}

impl FsBoardState {
    pub fn new(board_dir: impl Into<PathBuf>) -> Self {
        Self {
            board_dir: board_dir.into(),
        }
    }

    /// Load the snapshot. A board without a snapshot file is empty.
    pub async fn load(&self) -> Result<BoardSnapshot, StoreError> {
        let path = self.board_dir.join(BOARD_JSON);
        match read_optional(&path).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                debug!(path = %path.display(), "No board snapshot, using empty board");
                Ok(BoardSnapshot::default())
            }
        }
    }
}

#[async_trait]
impl BoardStateProvider for FsBoardState {
    async fn get_rules_data(
        &self,
        task_id: &str,
        target_columns: &[String],
    ) -> Result<RulesData, StoreError> {
        Ok(self.load().await?.rules_data(task_id, target_columns))
    }

    async fn get_subtasks(&self, task_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(self.load().await?.subtasks(task_id))
    }

    async fn get_task_history(&self, task_id: &str) -> Result<Vec<ChangeRecord>, StoreError> {
        Ok(self.load().await?.history(task_id))
    }
}
