//! Error types for nodeforge-engine
//!
//! Every variant that can carry user data routes it through
//! [`nodeforge_core::sanitize`] before display.

use nodeforge_core::sanitize::sanitize;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while generating a destination tree
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading a file
    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write file {}: {source}", path.display())]
    FileWrite {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error creating a directory
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error reading a directory
    #[error("Failed to read directory {}: {source}", path.display())]
    DirectoryRead {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error setting permission bits
    #[error("Failed to set permissions on {}: {source}", path.display())]
    Permissions {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Template source is not valid UTF-8
    #[error("Invalid UTF-8 in {}: {source}", path.display())]
    InvalidUtf8 {
        /// Path that failed
        path: PathBuf,
        /// Decoding error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Template rendering error
    #[error("Template rendering failed for {path}: {message}")]
    TemplateRender {
        /// Template path relative to the source directory
        path: String,
        /// Sanitized renderer diagnostic
        message: String,
    },

    /// Rendered output of a `.json` destination is not valid JSON
    ///
    /// `raw` keeps the rendered text for diagnosis.
    #[error(
        "Rendered output for {} is not valid JSON: {source}\n{}",
        path.display(),
        sanitize(.raw)
    )]
    JsonFormat {
        /// Destination that was not written
        path: PathBuf,
        /// Rendered text as produced by the template
        raw: String,
        /// JSON parse error
        #[source]
        source: serde_json::Error,
    },

    /// One or more file tasks failed
    #[error("{}", describe_failures(.failures))]
    Generation {
        /// Every failure of the run
        failures: Vec<Error>,
    },

    /// A generation task panicked or was cancelled
    #[error("Generation task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Flatten nested aggregates into a single list of failures
    #[must_use]
    pub fn into_failures(self) -> Vec<Self> {
        match self {
            Self::Generation { failures } => failures
                .into_iter()
                .flat_map(Self::into_failures)
                .collect(),
            other => vec![other],
        }
    }
}

fn describe_failures(failures: &[Error]) -> String {
    let mut text = match failures.len() {
        1 => "Generation failed for 1 file".to_string(),
        n => format!("Generation failed for {n} files"),
    };
    for failure in failures {
        let _ = write!(text, "\n  - {failure}");
    }
    text
}
