//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;

/// mcpset - Keep MCP server definitions in sync across client configs
#[derive(Parser, Debug)]
#[command(name = "mcpset")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the registry, templates and central store
    /// (default: ~/.mcp)
    #[arg(long, global = true, env = "MCPSET_HOME", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the central store and registered targets
    ///
    /// With --verbose, also shows each file's format and root key.
    Files,

    /// List or show templates
    Templates {
        /// Print one template in full
        #[arg(long, value_name = "NAME")]
        show: Option<String>,
    },

    /// List server entries per target
    List {
        /// Targets to list (default: central store and all targets)
        #[arg(short = 'f', long = "file", value_name = "NAME", num_args = 1..)]
        files: Vec<String>,

        /// Print each definition
        #[arg(long)]
        values: bool,

        /// Group by entry name instead of by target
        #[arg(long)]
        by_entry: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Add a server definition to the central store and targets
    ///
    /// Examples:
    ///   mcpset add fs -j '{"command": "npx", "args": ["-y", "fs"]}'
    ///   mcpset add fs -i fs.json -f codex
    ///   mcpset add fs -t filesystem -s ROOT=/srv/data
    #[command(group(
        ArgGroup::new("payload")
            .required(true)
            .args(["json", "input", "template"])
    ))]
    Add {
        /// Entry name
        key: String,

        /// Inline JSON definition
        #[arg(short = 'j', long)]
        json: Option<String>,

        /// Read the definition from a JSON file
        #[arg(short = 'i', long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Instantiate a template
        #[arg(short = 't', long, value_name = "NAME")]
        template: Option<String>,

        /// Template value, KEY=VAL or KEY:=JSON
        #[arg(short = 's', long = "set", value_name = "VAR=VAL", requires = "template")]
        set: Vec<String>,

        /// Do not fill placeholders from environment variables
        #[arg(long, requires = "template")]
        no_env: bool,

        /// Targets to add to besides the central store (default: all)
        #[arg(short = 'f', long = "file", value_name = "NAME", num_args = 1..)]
        files: Vec<String>,

        /// Replace existing definitions
        #[arg(long)]
        force: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove a server entry
    Remove {
        /// Entry name
        key: String,

        /// Where to remove from (default: central store and all targets)
        #[arg(short = 'f', long = "file", value_name = "NAME", num_args = 1..)]
        files: Vec<String>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Build the central store from existing target files
    ///
    /// The first target to define an entry wins. Without --apply this only
    /// previews the result.
    Init {
        /// Targets to read, in order (default: all)
        #[arg(short = 'f', long = "file", value_name = "NAME", num_args = 1..)]
        files: Vec<String>,

        /// Write the central store
        #[arg(long)]
        apply: bool,

        /// Extend existing entries with missing keys and list items
        #[arg(long)]
        deep: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Merge the central store into target files
    ///
    /// Existing entries in a target are kept unless --force is given.
    Sync {
        /// Targets to write (default: all)
        #[arg(short = 'f', long = "file", value_name = "NAME", num_args = 1..)]
        files: Vec<String>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Show a unified diff of each changed file
        #[arg(long)]
        diff: bool,

        /// Replace differing entries with the central definition
        #[arg(long, conflicts_with = "deep")]
        force: bool,

        /// Extend existing entries with missing keys and list items
        #[arg(long)]
        deep: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   mcpset completions bash > ~/.local/share/bash-completion/completions/mcpset
    ///   mcpset completions zsh > ~/.zfunc/_mcpset
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
