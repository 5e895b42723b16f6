//! Preset document loading and writing
//!
//! Presets live on disk as TOML, JSON or YAML; the format follows the file
//! extension. Each file becomes one [`PresetLayer`] named after its stem.

use crate::preset::PresetLayer;
use crate::{Error, Result};
use nodeforge_core::Value;
use nodeforge_core::sanitize::sanitize;
use std::fs;
use std::path::Path;

/// Permission bits for written documents, which may hold secrets
pub const DOCUMENT_MODE: u32 = 0o600;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a file extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Human readable format name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Parse `text` as a document in `format`
///
/// `path` is only used for error messages.
pub fn parse_document(text: &str, format: DocumentFormat, path: &Path) -> Result<Value> {
    let parse_error = |message: String| Error::Parse {
        path: path.to_path_buf(),
        format: format.name(),
        message: sanitize(&message),
    };

    match format {
        DocumentFormat::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
            Ok(from_toml(toml::Value::Table(table)))
        }
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string())),
        DocumentFormat::Yaml => {
            // An empty YAML file is an empty layer, not an error
            if text.trim().is_empty() {
                return Ok(Value::mapping());
            }
            serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))
        }
    }
}

/// Convert a TOML tree, rendering datetimes as their TOML text
fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(key, inner)| (key, from_toml(inner)))
                .collect(),
        ),
    }
}

/// Load a single preset layer from `path`
///
/// # Errors
///
/// Returns error if the file cannot be read, its extension is unknown, it
/// fails to parse, or its top level is not a mapping.
pub fn load_layer(path: &Path) -> Result<PresetLayer> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("preset")
        .to_string();

    let content = fs::read_to_string(path).map_err(|e| {
        Error::Message(format!("Failed to read preset {}: {e}", path.display()))
    })?;

    let document = parse_document(&content, format, path)?;
    if !matches!(document, Value::Mapping(_)) {
        return Err(Error::InvalidLayer {
            name,
            kind: document.kind(),
        });
    }

    tracing::debug!(layer = %name, path = %path.display(), "Loaded preset layer");
    Ok(PresetLayer::new(name, document))
}

/// Load preset layers from `paths`, keeping their order
pub fn load_layers<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PresetLayer>> {
    paths.iter().map(|p| load_layer(p.as_ref())).collect()
}

/// Serialize `value` in the format implied by `path`
pub fn render_document(value: &Value, path: &Path) -> Result<String> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let serialize_error = |message: String| Error::Serialize {
        format: format.name(),
        message: sanitize(&message),
    };

    match format {
        DocumentFormat::Toml => {
            toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
        }
        DocumentFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| serialize_error(e.to_string())),
        DocumentFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))
        }
    }
}

/// Write `value` to `path` in the format implied by its extension
///
/// Parent directories are created as needed. On Unix the file is readable
/// by its owner only ([`DOCUMENT_MODE`]), existing files included.
pub fn write_document(path: &Path, value: &Value) -> Result<()> {
    let text = render_document(value, path)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    write_private(path, &text)?;

    tracing::debug!(path = %path.display(), "Wrote resolved configuration");
    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, text: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(DOCUMENT_MODE)
        .open(path)?;
    // `mode` only applies when the file is created
    file.set_permissions(fs::Permissions::from_mode(DOCUMENT_MODE))?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), Some(DocumentFormat::Toml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.JSON")), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.ini")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_yaml_layer() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "mainnet.yaml", "network:\n  chainId: 1\n  peers: [a, b]\n");

        let layer = load_layer(&path).unwrap();
        assert_eq!(layer.name, "mainnet");
        assert_eq!(
            layer.document,
            Value::from(json!({"network": {"chainId": 1, "peers": ["a", "b"]}}))
        );
    }

    #[test]
    fn test_load_toml_layer() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "defaults.toml", "name = \"node\"\n[rpc]\nport = 8545\n");

        let layer = load_layer(&path).unwrap();
        assert_eq!(layer.name, "defaults");
        assert_eq!(layer.document, Value::from(json!({"name": "node", "rpc": {"port": 8545}})));
    }

    #[test]
    fn test_load_json_layer() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "custom.json", r#"{"x": null, "y": 1.5}"#);

        let layer = load_layer(&path).unwrap();
        assert_eq!(layer.document, Value::from(json!({"x": null, "y": 1.5})));
    }

    #[test]
    fn test_empty_yaml_is_empty_layer() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "empty.yml", "\n");
        assert_eq!(load_layer(&path).unwrap().document, Value::mapping());
    }

    #[test]
    fn test_non_mapping_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "list.json", "[1, 2]");

        let err = load_layer(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidLayer { kind: "sequence", .. }));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "preset.ini", "a=1");
        assert!(matches!(load_layer(&path), Err(Error::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_parse_error_mentions_path_and_format() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "broken.json", "{ not json");

        let message = load_layer(&path).unwrap_err().to_string();
        assert!(message.contains("JSON"));
        assert!(message.contains("broken.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_layer(Path::new("/nonexistent/preset.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read preset"));
    }

    #[test]
    fn test_load_layers_keeps_order() {
        let temp = TempDir::new().unwrap();
        let a = write(&temp, "a.json", r#"{"v": 1}"#);
        let b = write(&temp, "b.json", r#"{"v": 2}"#);

        let layers = load_layers(&[b, a]).unwrap();
        let names: Vec<_> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_write_document_json_round_trips_through_loader() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/resolved.json");
        let value = Value::from(json!({"b": 1, "a": {"c": [true]}}));

        write_document(&path, &value).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"b\": 1"));
        assert_eq!(load_layer(&path).unwrap().document, value);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_document_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/resolved.json");
        let value = Value::from(json!({"validator": {"privateKey": "abc"}}));

        // An existing world-readable file is tightened too
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_document(&path, &value).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, DOCUMENT_MODE);
        assert_eq!(load_layer(&path).unwrap().document, value);

        let fresh = temp.path().join("fresh.yaml");
        write_document(&fresh, &value).unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, DOCUMENT_MODE);
    }

    #[test]
    fn test_toml_datetimes_become_strings() {
        let document = parse_document(
            "genesisTime = 2024-01-01T00:00:00Z\n[fork]\nday = 2024-06-30\n",
            DocumentFormat::Toml,
            Path::new("times.toml"),
        )
        .unwrap();

        assert_eq!(
            document.get("genesisTime"),
            Some(&Value::from("2024-01-01T00:00:00Z"))
        );
        assert_eq!(document.pointer("fork.day"), Some(&Value::from("2024-06-30")));
        assert_eq!(document.get("genesisTime").unwrap().kind(), "string");
    }

    #[test]
    fn test_render_document_yaml_and_toml() {
        let value = Value::from(json!({"name": "n", "rpc": {"port": 8545}}));

        let yaml = render_document(&value, Path::new("x.yaml")).unwrap();
        assert!(yaml.contains("port: 8545"));

        let toml = render_document(&value, Path::new("x.toml")).unwrap();
        assert!(toml.contains("name = \"n\""));
        assert!(toml.contains("[rpc]"));
    }
}
