//! The init command: build the central store from existing targets

use colored::Colorize;
use serde_json::json;

use mcpset_core::{CentralStore, CollectOptions, Policy, Settings, TargetRegistry, collect};

use super::output;
use crate::error::{CliError, Result};

pub fn run_init(
    settings: &Settings,
    files: Vec<String>,
    apply: bool,
    deep: bool,
    as_json: bool,
) -> Result<()> {
    let registry = TargetRegistry::load(settings)?;
    let mut store = CentralStore::open(registry.central())?;
    let options = CollectOptions {
        targets: files,
        apply,
        policy: if deep {
            Policy::DeepAppend
        } else {
            Policy::AppendOnly
        },
    };
    let report = collect(&registry, &mut store, &options)?;

    if as_json {
        let out = json!({
            "entries": store.entries(),
            "provenance": report.provenance,
            "failures": report.run.failures,
            "store_written": report.store_written,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        if !report.run.success() {
            return Err(CliError::Failed {
                count: report.run.failures.len(),
            });
        }
        return Ok(());
    }

    println!("{} Collecting from targets...", "=>".blue().bold());
    output::print_report(&report.run);

    println!();
    println!(
        "{} {} entries in the central store:",
        "=>".blue().bold(),
        store.entries().len()
    );
    for record in &report.provenance {
        let also = if record.also_defined_in.is_empty() {
            String::new()
        } else {
            format!(" (also in {})", record.also_defined_in.join(", "))
        };
        println!(
            "   {} {} {}{}",
            "-".dimmed(),
            record.key,
            format!("from {}", record.introduced_by).dimmed(),
            also.yellow()
        );
    }

    if !report.run.success() {
        return Err(CliError::Failed {
            count: report.run.failures.len(),
        });
    }

    println!();
    if report.store_written {
        println!(
            "{} Wrote {}",
            "OK".green().bold(),
            registry.central().path.to_string().cyan()
        );
    } else if apply {
        println!("{} Central store already up to date.", "OK".green().bold());
    } else {
        println!(
            "Preview only. Run {} to write {}.",
            "mcpset init --apply".cyan(),
            registry.central().path
        );
    }
    Ok(())
}
