//! The add command

use std::path::PathBuf;

use colored::Colorize;
use serde_json::Value;

use mcpset_core::{
    AddOptions, CentralStore, Overrides, Settings, TargetRegistry, TemplateCatalog, add_entry,
};
use mcpset_fs::{NormalizedPath, io};

use super::output;
use crate::error::{CliError, Result};

/// Where the new definition comes from
#[derive(Debug, Clone)]
pub enum Payload {
    Inline(String),
    File(PathBuf),
    Template {
        name: String,
        set: Vec<String>,
        use_env: bool,
    },
}

fn resolve(settings: &Settings, payload: Payload) -> Result<Value> {
    match payload {
        Payload::Inline(text) => serde_json::from_str(&text)
            .map_err(|e| CliError::user(format!("Invalid JSON definition: {}", e))),
        Payload::File(path) => {
            let text = io::read_text(&NormalizedPath::new(&path))?;
            serde_json::from_str(&text).map_err(|e| {
                CliError::user(format!("Invalid JSON in {}: {}", path.display(), e))
            })
        }
        Payload::Template { name, set, use_env } => {
            let catalog = TemplateCatalog::load(settings)?;
            let overrides = Overrides::parse(&set)?.with_env(use_env);
            Ok(catalog.instantiate(&name, &overrides)?)
        }
    }
}

pub fn run_add(
    settings: &Settings,
    key: &str,
    payload: Payload,
    files: Vec<String>,
    force: bool,
    dry_run: bool,
) -> Result<()> {
    let definition = resolve(settings, payload)?;
    let registry = TargetRegistry::load(settings)?;
    let mut store = CentralStore::open(registry.central())?;

    println!("{} Adding {}...", "=>".blue().bold(), key.cyan());
    let options = AddOptions {
        targets: files,
        force,
        dry_run,
    };
    let report = add_entry(&registry, &mut store, key, definition, &options)?;
    output::print_report(&report);
    output::finish(&report)
}
