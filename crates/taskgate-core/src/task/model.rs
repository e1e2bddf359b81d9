//! Task domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Kanban task as seen by the rule engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether this task hangs under a parent task.
    pub fn is_subtask(&self) -> bool {
        self.parent_id.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Where a task sits in the board workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl WorkflowStatus {
    pub fn in_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            section: None,
        }
    }
}

/// Snapshot of a task on one side of a proposed change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub task: Task,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub status: WorkflowStatus,
}

/// One recorded change to a task, oldest first in a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub timestamp: DateTime<Utc>,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

/// A proposed change to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// `task_create`, `task_transition`, `task_update`, or any other string.
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<TaskState>,
    pub future_state: TaskState,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task: Option<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_subtasks: Vec<Task>,
}

impl TaskEvent {
    /// Whether the task changes column with this event.
    ///
    /// A task without a current state (creation) is always entering.
    pub fn is_entering_column(&self) -> bool {
        match &self.current_state {
            Some(current) => current.status.column != self.future_state.status.column,
            None => true,
        }
    }
}
