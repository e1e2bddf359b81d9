//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskgate_core::RuleEvaluationService;
use taskgate_store::{FsBoardState, FsRulesStore};

pub mod check;
pub mod rules;

/// Taskgate - rule checks for Kanban boards
#[derive(Parser)]
#[command(name = "taskgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the boards (defaults to current directory)
    #[arg(short, long, global = true, env = "TASKGATE_ROOT")]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text", env = "TASKGATE_FORMAT")]
    pub format: OutputFormat,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a proposed task change against a board's rules
    CheckTask(check::CheckTaskArgs),

    /// Check a proposed board configuration
    CheckBoard(check::CheckBoardArgs),

    /// List a board's rules
    Rules(rules::RulesArgs),

    /// Replace a board's rules with a rule set file
    ImportRules(rules::ImportRulesArgs),
}

impl Cli {
    /// Run the command. Returns whether the checked change is allowed.
    pub async fn execute(self) -> Result<bool> {
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };
        let store = FsRulesStore::new(root);

        match self.command {
            Commands::CheckTask(args) => check::execute_task(args, &store, self.format).await,
            Commands::CheckBoard(args) => check::execute_board(args, &store, self.format).await,
            Commands::Rules(args) => rules::execute(args, &store, self.format).await,
            Commands::ImportRules(args) => {
                rules::execute_import(args, &store, self.format).await
            }
        }
    }
}

/// Build the evaluation service for one board.
///
/// Board state is only read when an applicable task rule needs enrichment.
pub fn service_for(store: &FsRulesStore, board: &str) -> RuleEvaluationService {
    let board_state = FsBoardState::new(store.board_dir(board));
    RuleEvaluationService::new(Arc::new(store.clone()), Arc::new(board_state))
}

/// Read a JSON document from a file, or from stdin when the path is `-`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new("-") {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgate_core::task::TaskEvent;

    #[tokio::test]
    async fn test_read_json_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"event_type": "task_create",
                "future_state": {"task": {"title": "New"}, "status": {"column": "todo"}},
                "timestamp": "2025-05-01T08:00:00Z"}"#,
        )
        .unwrap();

        let event: TaskEvent = read_json(&path).await.unwrap();
        assert_eq!(event.future_state.task.title, "New");
    }

    #[tokio::test]
    async fn test_read_json_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, "nope").unwrap();

        let err = read_json::<TaskEvent>(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }
}
