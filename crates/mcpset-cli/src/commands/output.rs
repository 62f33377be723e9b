//! Shared rendering of run reports

use colored::{ColoredString, Colorize};

use mcpset_core::{Decision, RunReport, TargetOutcome, TargetStatus};

use crate::error::{CliError, Result};

fn status_tag(status: TargetStatus, dry_run: bool) -> ColoredString {
    match status {
        TargetStatus::UpToDate => "OK".green().bold(),
        TargetStatus::Written => "WROTE".green().bold(),
        TargetStatus::Pending if dry_run => "WOULD WRITE".yellow().bold(),
        TargetStatus::Pending => "PENDING".yellow().bold(),
        TargetStatus::Missing => "MISSING".yellow().bold(),
        TargetStatus::Skipped => "SKIP".dimmed(),
    }
}

fn decision_marker(decision: Decision) -> ColoredString {
    match decision {
        Decision::Added => "+".green(),
        Decision::Removed => "-".red(),
        Decision::Overridden => "~".yellow(),
        Decision::Extended => "~".cyan(),
        Decision::SkippedExisting => "=".dimmed(),
        Decision::Unchanged => " ".normal(),
    }
}

fn print_outcome(outcome: &TargetOutcome, dry_run: bool) {
    println!(
        "   {} {} ({})",
        status_tag(outcome.status, dry_run),
        outcome.target.cyan(),
        outcome.path.dimmed()
    );
    for entry in outcome.plan.notable() {
        let note = match entry.decision {
            Decision::SkippedExisting if entry.differences.is_empty() => {
                " (differs, kept)".to_string()
            }
            Decision::SkippedExisting => {
                format!(" (differs: {}, kept)", entry.differences.join(", "))
            }
            _ => String::new(),
        };
        println!(
            "      {} {} {}{}",
            decision_marker(entry.decision),
            entry.key,
            entry.decision.label().dimmed(),
            note.yellow()
        );
    }
    if let Some(diff) = &outcome.diff {
        for line in diff.lines() {
            let colored = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.normal()
            };
            println!("      {}", colored);
        }
    }
}

/// Print every outcome and failure of a run
pub fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        print_outcome(outcome, report.dry_run);
    }
    for failure in &report.failures {
        println!(
            "   {} {}: {}",
            "FAILED".red().bold(),
            failure.target.cyan(),
            failure.message
        );
    }
}

/// Print the closing line and turn target failures into an error
pub fn finish(report: &RunReport) -> Result<()> {
    if !report.success() {
        return Err(CliError::Failed {
            count: report.failures.len(),
        });
    }
    if report.dry_run {
        println!("{} Dry run, no files written.", "OK".green().bold());
    } else {
        println!(
            "{} {} file(s) written.",
            "OK".green().bold(),
            report.written()
        );
    }
    Ok(())
}
