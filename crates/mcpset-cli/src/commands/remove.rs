//! The remove command

use colored::Colorize;

use mcpset_core::{CentralStore, RemoveOptions, Settings, TargetRegistry, remove_entry};

use super::output;
use crate::error::Result;

pub fn run_remove(settings: &Settings, key: &str, files: Vec<String>, dry_run: bool) -> Result<()> {
    let registry = TargetRegistry::load(settings)?;
    let mut store = CentralStore::open(registry.central())?;

    println!("{} Removing {}...", "=>".blue().bold(), key.cyan());
    let options = RemoveOptions {
        targets: files,
        dry_run,
    };
    let report = remove_entry(&registry, &mut store, key, &options)?;
    output::print_report(&report);
    output::finish(&report)
}
