//! Common utilities and types shared across CLI commands

use anyhow::{Context, Result};
use clap::Args;
use nodeforge_config::{CONFIG_FILE_NAME, Config, PresetResolver, load_layers};
use nodeforge_core::Value;
use std::path::{Path, PathBuf};

/// State shared by every command of one invocation
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Run configuration
    pub config: Config,
}

impl RuntimeContext {
    /// Load the run configuration
    ///
    /// An explicit path must exist. Without one, `./nodeforge.toml` is used
    /// when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None if Path::new(CONFIG_FILE_NAME).is_file() => Config::load(CONFIG_FILE_NAME)
                .with_context(|| format!("Failed to load {CONFIG_FILE_NAME}"))?,
            None => {
                tracing::debug!("No {CONFIG_FILE_NAME} found, using defaults");
                Config::default()
            }
        };

        Ok(Self { config })
    }

    /// Wrap an already built configuration
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

/// Preset flags shared by commands that resolve presets
#[derive(Debug, Clone, Default, Args)]
pub struct PresetArgs {
    /// Extra preset file layered after the configured ones (repeatable)
    #[arg(long = "preset", value_name = "FILE")]
    pub presets: Vec<PathBuf>,
}

impl PresetArgs {
    /// Configured presets followed by the ones given on the command line
    #[must_use]
    pub fn layer_paths(&self, config: &Config) -> Vec<PathBuf> {
        config
            .presets
            .iter()
            .chain(&self.presets)
            .cloned()
            .collect()
    }

    /// Load every layer and resolve them into one configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a preset file cannot be loaded
    pub fn resolve(&self, config: &Config) -> Result<Value> {
        let paths = self.layer_paths(config);
        let layers = load_layers(&paths).context("Failed to load presets")?;

        tracing::debug!(layers = layers.len(), "Resolving presets");
        Ok(PresetResolver::new()
            .with_sequence_merge(config.sequence_merge)
            .resolve(&layers))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "outputDir = \"build\"\n").unwrap();

        let context = RuntimeContext::load(Some(path.as_path())).unwrap();
        assert_eq!(context.config.output_dir, temp.path().join("build"));
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let err = RuntimeContext::load(Some(Path::new("/nonexistent/nodeforge.toml")));
        assert!(err.is_err());
    }

    #[test]
    fn test_cli_presets_layer_last() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base.yaml");
        let top = temp.path().join("top.json");
        fs::write(&base, "network:\n  port: 1\n  name: a\n").unwrap();
        fs::write(&top, r#"{"network": {"port": 2}}"#).unwrap();

        let config = Config {
            presets: vec![base],
            ..Config::default()
        };
        let args = PresetArgs {
            presets: vec![top],
        };

        let resolved = args.resolve(&config).unwrap();
        assert_eq!(resolved.pointer("network.port"), Some(&Value::Integer(2)));
        assert_eq!(resolved.pointer("network.name"), Some(&Value::from("a")));
    }

    #[test]
    fn test_no_presets_resolves_empty() {
        let resolved = PresetArgs::default().resolve(&Config::default()).unwrap();
        assert_eq!(resolved, Value::mapping());
    }
}
