//! Generation run configuration
//!
//! A run is described by a `nodeforge.toml` file:
//!
//! ```toml
//! presets = ["presets/defaults.yaml", "presets/mainnet.yaml", "custom.toml"]
//! templateDir = "templates"
//! outputDir = "out"
//! exclude = ["README.md"]
//! include = []
//! sequenceMerge = "replace"
//! resolvedOutput = "out/resolved.json"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use crate::Result;
use crate::preset::SequenceMerge;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "nodeforge.toml";

/// Settings for one resolve-and-generate run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Preset files, lowest precedence first
    #[serde(default)]
    pub presets: Vec<PathBuf>,

    /// Template source directory
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Destination directory for generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Destination basenames that are never written
    #[serde(default)]
    pub exclude: Vec<String>,

    /// When non-empty, the only destination basenames that are written
    #[serde(default)]
    pub include: Vec<String>,

    /// How colliding sequences merge across layers
    #[serde(default)]
    pub sequence_merge: SequenceMerge,

    /// Where to persist the resolved configuration, if anywhere
    #[serde(default)]
    pub resolved_output: Option<PathBuf>,
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presets: Vec::new(),
            template_dir: default_template_dir(),
            output_dir: default_output_dir(),
            exclude: Vec::new(),
            include: Vec::new(),
            sequence_merge: SequenceMerge::default(),
            resolved_output: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            nodeforge_core::Error::Message(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, base).map_err(|e| {
            nodeforge_core::Error::Message(format!("{} ({})", e, path.display()))
        })
    }

    /// Parse configuration from TOML, resolving relative paths against `base_dir`
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails
    pub fn from_toml_str(toml_content: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_content).map_err(|e| {
            nodeforge_core::Error::Message(format!("Failed to parse config TOML: {e}"))
        })?;

        config.resolve_relative_paths(base_dir);
        Ok(config)
    }

    /// Make every configured path absolute relative to `base_dir`
    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };

        self.presets = self.presets.iter().map(|p| resolve(p)).collect();
        self.template_dir = resolve(&self.template_dir);
        self.output_dir = resolve(&self.output_dir);
        self.resolved_output = self.resolved_output.as_deref().map(resolve);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.presets.is_empty());
        assert_eq!(config.template_dir, PathBuf::from("templates"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.sequence_merge, SequenceMerge::Replace);
        assert!(config.resolved_output.is_none());
    }

    #[test]
    fn test_from_toml_resolves_paths() {
        let toml = r#"
presets = ["presets/defaults.yaml", "/abs/custom.toml"]
templateDir = "tpl"
exclude = ["README.md"]
sequenceMerge = "indexWise"
resolvedOutput = "out/resolved.json"
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();

        assert_eq!(
            config.presets,
            vec![
                PathBuf::from("/project/presets/defaults.yaml"),
                PathBuf::from("/abs/custom.toml")
            ]
        );
        assert_eq!(config.template_dir, PathBuf::from("/project/tpl"));
        assert_eq!(config.output_dir, PathBuf::from("/project/out"));
        assert_eq!(config.exclude, vec!["README.md".to_string()]);
        assert!(config.include.is_empty());
        assert_eq!(config.sequence_merge, SequenceMerge::IndexWise);
        assert_eq!(
            config.resolved_output,
            Some(PathBuf::from("/project/out/resolved.json"))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml_str("templates = \"x\"", Path::new("/")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config TOML"));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "presets = [\"a.yaml\"]\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.presets, vec![temp.path().join("a.yaml")]);
        assert_eq!(config.template_dir, temp.path().join("templates"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/nodeforge.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
