//! The list command: entries per target, or targets per entry

use std::collections::BTreeMap;

use colored::Colorize;
use serde_json::{Map, Value, json};

use mcpset_core::{Entries, Settings, Target, TargetRegistry};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub files: Vec<String>,
    pub values: bool,
    pub by_entry: bool,
    pub json: bool,
}

struct Listing<'a> {
    target: &'a Target,
    exists: bool,
    entries: Entries,
}

fn print_value(value: &Value) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    for line in pretty.lines() {
        println!("         {}", line.dimmed());
    }
    Ok(())
}

fn print_by_target(listings: &[Listing<'_>], values: bool) -> Result<()> {
    for listing in listings {
        let suffix = if listing.exists {
            format!("{} entries", listing.entries.len())
        } else {
            "missing".to_string()
        };
        println!(
            "{} {} ({}) {}",
            "=>".blue().bold(),
            listing.target.name.cyan(),
            listing.target.path.to_string().dimmed(),
            suffix.dimmed()
        );
        for (key, value) in &listing.entries {
            println!("   {} {}", "-".dimmed(), key);
            if values {
                print_value(value)?;
            }
        }
    }
    Ok(())
}

fn group_by_entry<'a>(listings: &'a [Listing<'a>]) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for listing in listings {
        for key in listing.entries.keys() {
            grouped
                .entry(key.as_str())
                .or_default()
                .push(listing.target.name.as_str());
        }
    }
    grouped
}

fn to_json(listings: &[Listing<'_>], args: &ListArgs) -> Value {
    if args.by_entry {
        return json!(group_by_entry(listings));
    }
    let mut out = Map::new();
    for listing in listings {
        let entries = if args.values {
            Value::Object(listing.entries.clone())
        } else {
            json!(listing.entries.keys().collect::<Vec<_>>())
        };
        out.insert(
            listing.target.name.clone(),
            json!({
                "path": listing.target.path.as_str(),
                "exists": listing.exists,
                "entries": entries,
            }),
        );
    }
    Value::Object(out)
}

pub fn run_list(settings: &Settings, args: &ListArgs) -> Result<()> {
    let registry = TargetRegistry::load(settings)?;
    let targets: Vec<&Target> = if args.files.is_empty() {
        registry.all().collect()
    } else {
        registry.select(&args.files)?
    };

    let mut listings = Vec::new();
    let mut failed = 0;
    for target in targets {
        match target.document() {
            Ok(document) => listings.push(Listing {
                target,
                exists: document.exists,
                entries: document.entries,
            }),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "FAILED".red().bold(), target.name, e);
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&listings, args))?);
    } else if args.by_entry {
        for (key, names) in group_by_entry(&listings) {
            println!("   {} {}", key.cyan(), names.join(", ").dimmed());
        }
    } else {
        print_by_target(&listings, args.values)?;
    }

    if failed > 0 {
        return Err(CliError::Failed { count: failed });
    }
    Ok(())
}
