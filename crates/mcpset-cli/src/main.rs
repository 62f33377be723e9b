//! mcpset CLI entry point

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;
use mcpset_core::Settings;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        commands::run_completions(shell);
        return Ok(());
    }

    let settings = match &cli.config_dir {
        Some(dir) => Settings::in_dir(dir),
        None => Settings::from_home()?,
    };
    tracing::debug!(config_dir = %settings.config_dir, "Resolved settings");

    execute(command, &settings, cli.verbose)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

fn execute(command: Commands, settings: &Settings, verbose: bool) -> Result<()> {
    match command {
        Commands::Files => commands::run_files(settings, verbose),
        Commands::Templates { show } => commands::run_templates(settings, show.as_deref()),
        Commands::List {
            files,
            values,
            by_entry,
            json,
        } => commands::run_list(
            settings,
            &commands::ListArgs {
                files,
                values,
                by_entry,
                json,
            },
        ),
        Commands::Add {
            key,
            json,
            input,
            template,
            set,
            no_env,
            files,
            force,
            dry_run,
        } => {
            let payload = match (json, input, template) {
                (Some(text), _, _) => commands::Payload::Inline(text),
                (None, Some(path), _) => commands::Payload::File(path),
                (None, None, Some(name)) => commands::Payload::Template {
                    name,
                    set,
                    use_env: !no_env,
                },
                (None, None, None) => {
                    return Err(error::CliError::user("One of -j, -i or -t is required"));
                }
            };
            commands::run_add(settings, &key, payload, files, force, dry_run)
        }
        Commands::Remove {
            key,
            files,
            dry_run,
        } => commands::run_remove(settings, &key, files, dry_run),
        Commands::Init {
            files,
            apply,
            deep,
            json,
        } => commands::run_init(settings, files, apply, deep, json),
        Commands::Sync {
            files,
            dry_run,
            diff,
            force,
            deep,
        } => commands::run_sync(settings, files, dry_run, diff, force, deep),
        Commands::Completions { shell } => {
            commands::run_completions(shell);
            Ok(())
        }
    }
}
