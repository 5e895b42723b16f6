//! Base error types for nodeforge
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be parsed in the given format
    #[error("Failed to parse {format} document {}: {message}", path.display())]
    Parse {
        /// Document path
        path: PathBuf,
        /// Format name (`TOML`, `JSON`, `YAML`)
        format: &'static str,
        /// Sanitized parser message
        message: String,
    },

    /// Document could not be serialized in the given format
    #[error("Failed to serialize {format} document: {message}")]
    Serialize {
        /// Format name (`TOML`, `JSON`, `YAML`)
        format: &'static str,
        /// Sanitized serializer message
        message: String,
    },

    /// A preset layer is not a mapping
    #[error("Preset layer '{name}' must be a mapping, found {kind}")]
    InvalidLayer {
        /// Layer name
        name: String,
        /// Kind of the top-level value found instead
        kind: &'static str,
    },

    /// File extension does not map to a known document format
    #[error("Unsupported document format: {}", path.display())]
    UnsupportedFormat {
        /// Document path
        path: PathBuf,
    },

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
