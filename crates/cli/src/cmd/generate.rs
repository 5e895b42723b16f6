//! Generate command implementation
//!
//! Resolves the preset layers and renders the template directory into the
//! output directory.

use anyhow::{Context, Result};
use clap::Args;
use nodeforge_config::write_document;
use nodeforge_engine::{GenerateReport, Generator};
use nodeforge_template::TemplateEngine;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::Command;
use crate::common::{PresetArgs, RuntimeContext};

/// Generate command arguments
#[derive(Debug, Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub presets: PresetArgs,

    /// Template source directory (overrides templateDir)
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Destination directory (overrides outputDir)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Never write a file with this destination name (repeatable)
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Only write files with this destination name (repeatable)
    #[arg(long, value_name = "NAME")]
    pub include: Vec<String>,
}

impl Command for GenerateCommand {
    type Output = GenerateReport;

    fn execute(&self, context: &RuntimeContext) -> Result<GenerateReport> {
        let config = &context.config;
        let resolved = self.presets.resolve(config)?;

        if let Some(path) = &config.resolved_output {
            write_document(path, &resolved).with_context(|| {
                format!("Failed to write resolved configuration to {}", path.display())
            })?;
            tracing::info!(path = %path.display(), "Wrote resolved configuration");
        }

        let template_dir = self.templates.as_ref().unwrap_or(&config.template_dir);
        let output_dir = self.output.as_ref().unwrap_or(&config.output_dir);

        let generator = Generator::new(Arc::new(TemplateEngine::new()), Arc::new(resolved))
            .exclude(config.exclude.iter().chain(&self.exclude).cloned())
            .include(config.include.iter().chain(&self.include).cloned());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let report = runtime
            .block_on(generator.generate(template_dir, output_dir))
            .with_context(|| {
                format!(
                    "Failed to generate {} from {}",
                    output_dir.display(),
                    template_dir.display()
                )
            })?;

        println!(
            "Generated {} files in {} ({report})",
            report.written(),
            output_dir.display()
        );
        Ok(report)
    }
}
