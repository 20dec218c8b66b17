//! Printing a [`BatchReport`] and turning an ad-hoc miss into an exit code.

use anyhow::Result;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use mxpatch_batch::pipeline::OutcomeCounts;
use mxpatch_batch::{BatchReport, ItemOutcome, ItemReport};

use crate::exit::ItemFailure;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "resource")]
    resource: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "outcome")]
    outcome: &'static str,
    #[tabled(rename = "output")]
    output: String,
}

impl From<&ItemReport> for ItemRow {
    fn from(item: &ItemReport) -> Self {
        let output = match &item.outcome {
            ItemOutcome::Created {
                output,
                undo: Some(undo),
            } => format!("{}\n{}", output.display(), undo.display()),
            ItemOutcome::Created { output, undo: None } => output.display().to_string(),
            ItemOutcome::Error { reason } => reason.clone(),
            _ => String::new(),
        };
        Self {
            resource: item.resource.clone(),
            name: item.name.clone(),
            outcome: item.outcome.label(),
            output,
        }
    }
}

/// Print the report, then fail if the only item of an ad-hoc run was not produced.
pub fn finish(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_human(report);
    }

    match (report.single_outcome(), report.items.first()) {
        (Some(outcome), Some(item)) => match ItemFailure::from_outcome(&item.resource, outcome) {
            Some(failure) => Err(failure.into()),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn print_human(report: &BatchReport) {
    let route = match &report.destination {
        Some(dest) => format!("{} → {}", report.source, dest),
        None => report.source.clone(),
    };

    if report.single_outcome().is_some() {
        print_single(report, &route);
        return;
    }

    if report.items.is_empty() {
        println!("No items to process ({route}).");
        return;
    }

    let rows: Vec<ItemRow> = report.items.iter().map(ItemRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", route.bold());
    println!("{table}");
    println!("{}", summary_line(&report.counts));
    if let Some(log) = &report.skip_log {
        println!("  Skipped items logged to: {}", log.display());
    }
}

fn print_single(report: &BatchReport, route: &str) {
    let Some(item) = report.items.first() else {
        return;
    };
    match &item.outcome {
        ItemOutcome::Created { output, undo } => {
            println!("✓ {} ({route}) → {}", item.resource, output.display());
            if let Some(undo) = undo {
                println!("  Undo: {}", undo.display());
            }
        }
        ItemOutcome::Empty => println!(
            "{}",
            format!("No changes for {} ({route})", item.resource).bright_black()
        ),
        other => println!(
            "{}",
            format!("✗ {} ({route}): {}", item.resource, other.label()).red()
        ),
    }
}

fn summary_line(counts: &OutcomeCounts) -> String {
    let created = format!("{} created", counts.created).green().to_string();
    let mut parts = vec![created];
    let rest = [
        (counts.empty, "empty"),
        (counts.missing_source, "missing in source"),
        (counts.missing_destination, "missing in destination"),
        (counts.missing_both, "missing in both"),
    ];
    for (count, label) in rest {
        if count > 0 {
            parts.push(format!("{count} {label}").yellow().to_string());
        }
    }
    if counts.error > 0 {
        parts.push(format!("{} failed", counts.error).red().to_string());
    }
    parts.join(", ")
}
