//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Give hardcoded display text keys in the reference language
//! - `rewrite`: Replace stored literals with lookups, then repair
//! - `repair`: Remove constant modifiers that now wrap a lookup
//! - `run`: The full pipeline (extract, rewrite, repair, sync, persist)
//! - `merge`: Merge provided translations with placeholder validation
//! - `check`: Report placeholder mismatches and missing translations
//! - `init`: Initialize relingo configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// The common args of the command, if it has any.
    pub fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Extract(cmd))
            | Some(Command::Rewrite(cmd))
            | Some(Command::Repair(cmd))
            | Some(Command::Run(cmd)) => Some(&cmd.common),
            Some(Command::Merge(cmd)) => Some(&cmd.common),
            Some(Command::Check(cmd)) => Some(&cmd.common),
            Some(Command::Init) | None => None,
        }
    }

    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|c| c.verbose)
    }

    pub fn json(&self) -> bool {
        self.common().is_some_and(|c| c.json)
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, env = "RELINGO_ROOT")]
    pub root: Option<PathBuf>,

    /// Translations directory (overrides config file)
    #[arg(long)]
    pub translations_dir: Option<String>,

    /// Reference language (overrides config file)
    #[arg(long)]
    pub reference_language: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the run summary and issues as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments of the commands that work on source scopes.
#[derive(Debug, Args)]
pub struct ScopeCommand {
    /// Scopes (package names) to process
    #[arg(required = true)]
    pub scopes: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually write changes (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct MergeCommand {
    /// JSON document of the form { "<lang>": { "<key>": "<text>" } }
    #[arg(long)]
    pub translations: PathBuf,

    /// Flat JSON document merged into the reference language
    #[arg(long)]
    pub reference: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually write changes (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Give hardcoded display text keys and add them to the reference language
    Extract(ScopeCommand),
    /// Replace stored literals with lookups and repair constant expressions
    Rewrite(ScopeCommand),
    /// Remove constant modifiers from expressions that contain a lookup
    Repair(ScopeCommand),
    /// Extract, rewrite, repair, sync stand-ins and persist
    Run(ScopeCommand),
    /// Merge provided translations into the translation files
    Merge(MergeCommand),
    /// Report placeholder mismatches and missing translations
    Check(CheckCommand),
    /// Initialize a new .relingorc.json configuration file
    Init,
}
