//! Terminal output formatting.

use anyhow::Result;
use colored::Colorize;
use taskgate_core::rules::{Rule, RuleEvaluationResult};

use crate::commands::OutputFormat;

/// Print an evaluation result.
pub fn print_result(result: &RuleEvaluationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => print_result_text(result),
    }
    Ok(())
}

fn print_result_text(result: &RuleEvaluationResult) {
    if result.allowed {
        println!("{} Change allowed", "✓".green().bold());
        return;
    }

    println!(
        "{} Change denied: {} violation(s)",
        "✗".red().bold(),
        result.violations.len()
    );
    println!();

    for violation in &result.violations {
        println!(
            "  {} {} {}",
            format!("[{}]", violation.priority).yellow(),
            violation.rule_id.cyan(),
            format!("({})", violation.category).dimmed()
        );
        println!("      {}", violation.message);
        if let Some(details) = &violation.details {
            println!("      {}", details.dimmed());
        }
    }
}

/// Print rules as a table, marking those in `applicable`.
pub fn print_rules_table(rules: &[Rule], event_type: Option<&str>, applicable: &[&str]) {
    if rules.is_empty() {
        println!("{}", "No rules found.".dimmed());
        return;
    }

    println!(
        "{:<3} {:<28} {:<20} {:<16} {:>8} {:<8}",
        "", "ID", "Category", "Trigger", "Priority", "Enabled"
    );
    println!("{}", "─".repeat(88));

    for rule in rules {
        let marker = if applicable.contains(&rule.id.as_str()) {
            "●".green()
        } else {
            " ".normal()
        };
        let enabled = if rule.enabled {
            "yes".green()
        } else {
            "no".dimmed()
        };

        println!(
            "{:<3} {:<28} {:<20} {:<16} {:>8} {:<8}",
            marker,
            truncate(&rule.id, 26),
            rule.category.as_str(),
            truncate(&rule.trigger_type, 14),
            rule.priority,
            enabled
        );
    }

    println!();
    match event_type {
        Some(event_type) => println!(
            "{} rule(s), {} applicable to {}",
            rules.len(),
            applicable.len(),
            event_type.cyan()
        ),
        None => println!("{} rule(s) total", rules.len()),
    }
}

/// Truncate a string to `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
