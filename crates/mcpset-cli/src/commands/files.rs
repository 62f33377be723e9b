//! The files command: where everything lives

use colored::Colorize;

use mcpset_core::{Settings, Target, TargetRegistry};

use crate::error::Result;

fn print_target(target: &Target, verbose: bool) {
    let state = if target.path.exists() {
        "OK".green().bold()
    } else {
        "MISSING".yellow().bold()
    };
    println!("   {} {} {}", state, target.name.cyan(), target.path);
    if verbose {
        println!(
            "      {} {}, {} {}",
            "format".dimmed(),
            target.format,
            "root".dimmed(),
            target.root
        );
    }
}

pub fn run_files(settings: &Settings, verbose: bool) -> Result<()> {
    println!("{} Config directory: {}", "=>".blue().bold(), settings.config_dir);
    println!("   {} {}", "registry ".dimmed(), settings.targets_file);
    println!("   {} {}", "templates".dimmed(), settings.templates_file);

    let registry = TargetRegistry::load(settings)?;
    println!();
    println!("{} Central store:", "=>".blue().bold());
    print_target(registry.central(), verbose);

    println!();
    if registry.targets().is_empty() {
        println!("{} No targets registered.", "=>".blue().bold());
        println!("Add entries to {}.", settings.targets_file.as_str().cyan());
        return Ok(());
    }
    println!("{} Targets:", "=>".blue().bold());
    for target in registry.targets() {
        print_target(target, verbose);
    }
    Ok(())
}
