pub mod convert;
pub mod rewrite;
pub mod translate;

use crate::report::{ConversionReport, FileStatus};
use colored::Colorize;

/// Serialize a value as pretty-printed JSON and print it to stdout.
fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Human-readable run summary followed by the manual follow-up list.
fn print_report(report: &ConversionReport, dry_run: bool) {
    if report.files.is_empty() {
        println!("No files to convert");
        return;
    }

    let statuses = report
        .statuses
        .iter()
        .map(|(status, n)| format!("{n} {}", status.as_str()))
    .collect::<Vec<_>>()
    .join(", ");

    let prefix = if dry_run { "[dry run] " } else { "" };
    println!("{prefix}{} file(s): {statuses}", report.files.len());
    println!(
        "  {} {}  {} {}  {} {}",
        "semantic".green(),
        report.totals.semantic,
        "structural".cyan(),
        report.totals.structural,
        "fallback".yellow(),
        report.totals.fallback
    );

    for file in report.files.iter().filter(|f| f.status == FileStatus::Failed) {
        println!(
            "  {} {}: {}",
            "failed".red(),
            file.source,
            file.error.as_deref().unwrap_or("unknown error")
        );
    }

    let mut manual = report.manual_items().peekable();
    if manual.peek().is_some() {
        println!();
        println!("{}", "Manual follow-up:".bold());
        for (file, item) in manual {
            let location = file.target.as_deref().unwrap_or(&file.source);
            println!(
                "  {}:{}  [{}] {}",
                location,
                item.line,
                item.kind.as_str(),
                item.source.dimmed()
            );
        }
    }
}
