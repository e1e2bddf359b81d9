//! Change check commands.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use taskgate_core::board::BoardConfigurationEvent;
use taskgate_core::task::TaskEvent;
use taskgate_store::FsRulesStore;
use tracing::debug;

use super::{read_json, service_for, OutputFormat};
use crate::output;

#[derive(Args)]
pub struct CheckTaskArgs {
    /// Board path, relative to the root directory
    #[arg(short, long, env = "TASKGATE_BOARD")]
    pub board: String,

    /// Task event JSON file (`-` for stdin)
    #[arg(short, long)]
    pub event: PathBuf,
}

#[derive(Args)]
pub struct CheckBoardArgs {
    /// Board configuration event JSON file (`-` for stdin)
    #[arg(short, long)]
    pub event: PathBuf,
}

pub async fn execute_task(
    args: CheckTaskArgs,
    store: &FsRulesStore,
    format: OutputFormat,
) -> Result<bool> {
    let event: TaskEvent = read_json(&args.event).await?;
    debug!(board = %args.board, event_type = %event.event_type, "Checking task change");
    let service = service_for(store, &args.board);
    let result = service.evaluate_task_change(&event, &args.board).await?;
    output::print_result(&result, format)?;
    Ok(result.allowed)
}

pub async fn execute_board(
    args: CheckBoardArgs,
    store: &FsRulesStore,
    format: OutputFormat,
) -> Result<bool> {
    let event: BoardConfigurationEvent = read_json(&args.event).await?;
    debug!(event_type = %event.event_type, "Checking board configuration");
    // Board rules are compiled in and never consult board state, so the
    // state handle here is the root directory and is never read.
    let service = service_for(store, ".");
    let result = service.evaluate_board_configuration_change(&event).await?;
    output::print_result(&result, format)?;
    Ok(result.allowed)
}
