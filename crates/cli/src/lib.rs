//! Nodeforge CLI library
//!
//! This library contains all the CLI logic for nodeforge, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// Nodeforge - layered presets in, node configuration trees out
#[derive(Parser)]
#[command(name = "nodeforge")]
#[command(about = "Generate node configuration trees from layered presets")]
#[command(version)]
#[command(long_about = "Generate node configuration trees from layered presets

Preset documents (TOML, JSON or YAML) are deep-merged in order, pruned of
null and empty values, and used to render a directory of templates into a
destination tree.

Files whose name contains `.mustache` are rendered; everything else is
copied verbatim. Generated files are readable by their owner only.")]
pub struct Cli {
    /// Path to the run configuration (default: ./nodeforge.toml if present)
    #[arg(long, env = "NODEFORGE_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "NODEFORGE_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for nodeforge CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve presets and generate the destination tree
    #[command(long_about = "Resolve presets and generate the destination tree

Flags override the run configuration: extra --preset files are layered on top
of the configured ones, --exclude and --include extend the configured lists.

Examples:
  • nodeforge generate
      → Use ./nodeforge.toml

  • nodeforge generate --preset mainnet.yaml --output /etc/node
      → Layer mainnet.yaml last and write into /etc/node

  • nodeforge generate --include genesis.json
      → Only write genesis.json")]
    Generate(cmd::generate::GenerateCommand),

    /// Resolve presets and print the result as JSON
    Resolve(cmd::resolve::ResolveCommand),
}

/// Execute the command based on the command type
fn execute_command(command: &Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Generate(generate_cmd) => {
            generate_cmd.execute(context)?;
        }
        Commands::Resolve(resolve_cmd) => {
            resolve_cmd.execute(context)?;
        }
    }

    Ok(())
}

/// Main entry point for the CLI logic
///
/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - Configuration loading fails
/// - Command execution fails
pub fn run(cli: Cli) -> Result<()> {
    nodeforge_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let context = RuntimeContext::load(cli.config.as_deref())?;
    execute_command(&cli.command, &context)
}
