//! Centralized error types for Taskgate.

use thiserror::Error;

/// Errors that abort an evaluation.
///
/// Rule-content problems never show up here; they are reported as
/// violations in a successful result.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Board configuration is required")]
    MissingConfiguration,

    #[error("Failed to read rules for board '{board_path}': {source}")]
    ReadRules {
        board_path: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to enrich context for task '{task_id}' ({step}): {source}")]
    Enrichment {
        task_id: String,
        step: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Result type for Taskgate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Errors reported by the rules store and board-state provider.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl StoreError {
    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
