//! Resolve command implementation
//!
//! Prints the merged and pruned preset configuration.

use anyhow::{Context, Result};
use clap::Args;
use nodeforge_config::write_document;
use nodeforge_core::Value;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::{PresetArgs, RuntimeContext};

/// Resolve command arguments
#[derive(Debug, Args)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub presets: PresetArgs,

    /// Write to a file instead of stdout; format follows the extension
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Command for ResolveCommand {
    type Output = Value;

    fn execute(&self, context: &RuntimeContext) -> Result<Value> {
        let resolved = self.presets.resolve(&context.config)?;

        match &self.output {
            Some(path) => {
                write_document(path, &resolved).with_context(|| {
                    format!("Failed to write resolved configuration to {}", path.display())
                })?;
                tracing::info!(path = %path.display(), "Wrote resolved configuration");
            }
            None => println!("{}", resolved.to_pretty_json()),
        }

        Ok(resolved)
    }
}
