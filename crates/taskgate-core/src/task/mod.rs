//! Tasks and task change events.

pub mod model;

pub use model::{ChangeRecord, Task, TaskEvent, TaskState, WorkflowStatus};

/// Event type emitted when a task is created.
pub const TASK_CREATE: &str = "task_create";
/// Event type emitted when a task moves between columns.
pub const TASK_TRANSITION: &str = "task_transition";
/// Event type emitted when task fields change in place.
pub const TASK_UPDATE: &str = "task_update";
