//! The sync command: central store into target files

use colored::Colorize;

use mcpset_core::{ApplyOptions, CentralStore, Policy, Settings, TargetRegistry, apply};

use super::output;
use crate::error::Result;

pub fn run_sync(
    settings: &Settings,
    files: Vec<String>,
    dry_run: bool,
    diff: bool,
    force: bool,
    deep: bool,
) -> Result<()> {
    let policy = match (force, deep) {
        (true, _) => Policy::Override,
        (false, true) => Policy::DeepAppend,
        (false, false) => Policy::AppendOnly,
    };

    let registry = TargetRegistry::load(settings)?;
    let store = CentralStore::open(registry.central())?;
    println!(
        "{} Syncing {} entries from {}...",
        "=>".blue().bold(),
        store.entries().len(),
        registry.central().path.to_string().cyan()
    );
    if registry.targets().is_empty() {
        println!("No targets registered in {}.", settings.targets_file);
        return Ok(());
    }

    let options = ApplyOptions {
        targets: files,
        dry_run,
        diff,
        policy,
    };
    let report = apply(&registry, &store, &options)?;
    output::print_report(&report);
    output::finish(&report)
}
