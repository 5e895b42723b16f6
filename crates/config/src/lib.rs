//! Preset resolution and run configuration for nodeforge
//!
//! This crate handles:
//! - Deep merging of ordered preset layers
//! - Pruning of null, `NaN` and empty values
//! - Loading preset documents (TOML, JSON, YAML)
//! - Run configuration (`nodeforge.toml`)
//! - Logging initialization

pub mod config;
pub mod loader;
pub mod logging;
pub mod preset;
pub mod prune;

// Re-export error types from core
pub use nodeforge_core::{Error, Result};

// Re-export main types
pub use config::{CONFIG_FILE_NAME, Config};
pub use loader::{
    DocumentFormat, load_layer, load_layers, parse_document, render_document, write_document,
};
pub use preset::{PresetLayer, PresetResolver, SequenceMerge, resolve};
pub use prune::prune;
