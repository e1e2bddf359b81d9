//! Rule listing and import commands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use taskgate_core::rules::filter::applicable_rules;
use taskgate_core::rules::{Rule, RuleSet, RulesStore};
use taskgate_store::FsRulesStore;
use tracing::info;

use super::{read_json, OutputFormat};
use crate::output;

#[derive(Args)]
pub struct RulesArgs {
    /// Board path, relative to the root directory
    #[arg(short, long, env = "TASKGATE_BOARD")]
    pub board: String,

    /// Mark the rules applicable to this event type
    #[arg(short, long)]
    pub event_type: Option<String>,
}

#[derive(Args)]
pub struct ImportRulesArgs {
    /// Board path, relative to the root directory
    #[arg(short, long, env = "TASKGATE_BOARD")]
    pub board: String,

    /// Rule set JSON file (`-` for stdin)
    #[arg(short, long)]
    pub file: PathBuf,
}

/// A stored rule with its applicability to the listed event type.
#[derive(Debug, Serialize)]
pub struct RuleListing<'a> {
    #[serde(flatten)]
    pub rule: &'a Rule,
    pub applicable: bool,
}

/// Pair each rule with whether it is in `applicable`.
pub fn listings<'a>(rules: &'a [Rule], applicable: &[&str]) -> Vec<RuleListing<'a>> {
    rules
        .iter()
        .map(|rule| RuleListing {
            rule,
            applicable: applicable.contains(&rule.id.as_str()),
        })
        .collect()
}

pub async fn execute(args: RulesArgs, store: &FsRulesStore, format: OutputFormat) -> Result<bool> {
    let rule_set = store.read_rules(&args.board).await?;

    let applicable: Vec<&str> = match &args.event_type {
        Some(event_type) => applicable_rules(&rule_set.rules, event_type)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect(),
        None => Vec::new(),
    };

    match format {
        OutputFormat::Json => {
            let listed = listings(&rule_set.rules, &applicable);
            println!("{}", serde_json::to_string_pretty(&listed)?)
        }
        OutputFormat::Text => {
            output::print_rules_table(&rule_set.rules, args.event_type.as_deref(), &applicable)
        }
    }
    Ok(true)
}

pub async fn execute_import(
    args: ImportRulesArgs,
    store: &FsRulesStore,
    format: OutputFormat,
) -> Result<bool> {
    let rule_set: RuleSet = read_json(&args.file).await?;
    store.save_rules(&args.board, &rule_set).await?;
    info!(board = %args.board, rules = rule_set.rules.len(), "Rules imported");

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "board": args.board, "rules": rule_set.rules.len() })
        ),
        OutputFormat::Text => println!(
            "{} Imported {} rule(s) into {}",
            "✓".green().bold(),
            rule_set.rules.len(),
            args.board.cyan()
        ),
    }
    Ok(true)
}
