//! File tasks
//!
//! Each source file maps to one [`FileTask`]: where it is read from, where it
//! is written to, and whether it is rendered or copied verbatim.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Filename marker that turns a file into a template
pub const TEMPLATE_MARKER: &str = ".mustache";

/// How a file reaches its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Rendered through the template engine
    Render,
    /// Copied byte for byte
    Copy,
}

/// Unit of work for a single source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Absolute source path
    pub source: PathBuf,
    /// Absolute destination path
    pub destination: PathBuf,
    /// Source path relative to the source root, used in messages
    pub relative: PathBuf,
    /// Render or copy
    pub kind: TaskKind,
}

impl FileTask {
    /// Plan the task for `file_name` found in `source_dir`
    ///
    /// `relative_dir` is `source_dir` relative to the source root.
    #[must_use]
    pub fn plan(source_dir: &Path, dest_dir: &Path, relative_dir: &Path, file_name: &str) -> Self {
        let (dest_name, kind) = destination_name(file_name);
        Self {
            source: source_dir.join(file_name),
            destination: dest_dir.join(dest_name),
            relative: relative_dir.join(file_name),
            kind,
        }
    }

    /// Destination basename
    #[must_use]
    pub fn destination_name(&self) -> &str {
        self.destination
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Whether rendered output must be re-serialized as JSON
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.kind == TaskKind::Render
            && self
                .destination_name()
                .to_ascii_lowercase()
                .ends_with(".json")
    }
}

/// Destination filename and task kind for a source filename
///
/// The first occurrence of [`TEMPLATE_MARKER`] is stripped.
///
/// ```
/// use nodeforge_engine::task::{destination_name, TaskKind};
///
/// assert_eq!(destination_name("node.properties.mustache"), ("node.properties".into(), TaskKind::Render));
/// assert_eq!(destination_name("banner.txt"), ("banner.txt".into(), TaskKind::Copy));
/// ```
#[must_use]
pub fn destination_name(file_name: &str) -> (String, TaskKind) {
    match file_name.find(TEMPLATE_MARKER) {
        Some(at) => {
            let mut name = String::with_capacity(file_name.len() - TEMPLATE_MARKER.len());
            name.push_str(&file_name[..at]);
            name.push_str(&file_name[at + TEMPLATE_MARKER.len()..]);
            (name, TaskKind::Render)
        }
        None => (file_name.to_string(), TaskKind::Copy),
    }
}

/// Include/exclude filtering on destination basenames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    exclude: HashSet<String>,
    include: HashSet<String>,
}

impl NameFilter {
    /// Create a filter from exclude and include lists
    #[must_use]
    pub fn new<E, I, S, T>(exclude: E, include: I) -> Self
    where
        E: IntoIterator<Item = S>,
        I: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            include: include.into_iter().map(Into::into).collect(),
        }
    }

    /// Add names that are never written
    pub fn exclude<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.exclude.extend(names.into_iter().map(Into::into));
    }

    /// Add names to the allow-list
    pub fn include<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.include.extend(names.into_iter().map(Into::into));
    }

    /// A name is eligible unless excluded; a non-empty include list is an
    /// exclusive allow-list
    #[must_use]
    pub fn is_eligible(&self, name: &str) -> bool {
        !self.exclude.contains(name) && (self.include.is_empty() || self.include.contains(name))
    }
}
