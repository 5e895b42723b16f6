//! # Nodeforge Template
//!
//! Template rendering for nodeforge using minijinja.
//!
//! Each [`TemplateEngine`] owns its own environment with the node helper set
//! registered on it (number grouping, hex formatting, JSON, durations, memory
//! sizing). Rendering failures carry a sanitized diagnostic.

pub mod engine;
pub mod formatters;
pub mod functions;

pub use engine::TemplateEngine;
pub use formatters::{FixedMemory, FormatError, MemoryProbe, SystemMemory};

use thiserror::Error;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, Error>;

/// Template engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Template failed to compile or execute
    ///
    /// `diagnostic` bundles the sanitized error chain, template text and
    /// context.
    #[error("Template error at {location}\n{diagnostic}")]
    Render {
        /// `name line N, column M`
        location: String,
        /// Sanitized error chain, template and context
        diagnostic: String,
    },
}

/// Human readable location of a minijinja error
pub(crate) fn error_location(err: &minijinja::Error) -> String {
    match (err.name(), err.line(), err.range()) {
        (Some(name), Some(line), Some(range)) => {
            format!("{name} line {line}, column {}", range.start)
        }
        (Some(name), Some(line), None) => format!("{name} line {line}"),
        (None, Some(line), Some(range)) => format!("line {line}, column {}", range.start),
        (None, Some(line), None) => format!("line {line}"),
        (Some(name), None, _) => name.to_string(),
        _ => "unknown location".to_string(),
    }
}
