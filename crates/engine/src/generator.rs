//! Destination tree generation
//!
//! Mirrors a template source directory into a destination directory. Every
//! directory entry becomes its own tokio task; a directory is created before
//! its children are spawned and every directory joins all of its tasks before
//! returning.
//!
//! Failures are collected, not short-circuited: all dispatched siblings run to
//! completion, files that succeeded stay written, and every failure in the
//! tree is reported together in [`Error::Generation`].

use crate::error::{Error, Result};
use crate::task::{FileTask, NameFilter, TaskKind};
use nodeforge_core::sanitize::sanitize;
use nodeforge_core::{TemplateRenderer, Value};
use nodeforge_template::TemplateEngine;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Permission bits for every generated file
pub const OUTPUT_MODE: u32 = 0o600;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Summary of a generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Templates rendered
    pub rendered: usize,
    /// Assets copied verbatim
    pub copied: usize,
    /// Files filtered out by include/exclude
    pub skipped: usize,
    /// Directories mirrored below the destination root
    pub directories: usize,
}

impl GenerateReport {
    fn merge(&mut self, other: Self) {
        self.rendered += other.rendered;
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.directories += other.directories;
    }

    /// Total files written
    #[must_use]
    pub const fn written(&self) -> usize {
        self.rendered + self.copied
    }
}

impl fmt::Display for GenerateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rendered, {} copied, {} skipped, {} directories",
            self.rendered, self.copied, self.skipped, self.directories
        )
    }
}

/// Report and failures of one subtree
#[derive(Debug, Default)]
struct Outcome {
    report: GenerateReport,
    failures: Vec<Error>,
}

impl Outcome {
    fn merge(&mut self, other: Self) {
        self.report.merge(other.report);
        self.failures.extend(other.failures);
    }

    fn from_file(result: Result<TaskKind>) -> Self {
        let mut outcome = Self::default();
        match result {
            Ok(TaskKind::Render) => outcome.report.rendered = 1,
            Ok(TaskKind::Copy) => outcome.report.copied = 1,
            Err(e) => outcome.failures.push(e),
        }
        outcome
    }

    fn failed(error: Error) -> Self {
        Self {
            report: GenerateReport::default(),
            failures: vec![error],
        }
    }
}

/// State shared read-only by every task of a run
struct Walk<R> {
    renderer: Arc<R>,
    context: Arc<Value>,
    filter: NameFilter,
}

/// Generates destination trees from template directories
///
/// # Examples
///
/// ```no_run
/// use nodeforge_engine::Generator;
/// use nodeforge_template::TemplateEngine;
/// use nodeforge_core::Value;
/// use std::sync::Arc;
///
/// # async fn run() -> nodeforge_engine::Result<()> {
/// let context = Arc::new(Value::from(serde_json::json!({"name": "validator-1"})));
/// let report = Generator::new(Arc::new(TemplateEngine::new()), context)
///     .exclude(["README.md"])
///     .generate("templates", "out")
///     .await?;
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
pub struct Generator<R = TemplateEngine> {
    renderer: Arc<R>,
    context: Arc<Value>,
    filter: NameFilter,
}

impl<R: TemplateRenderer + 'static> Generator<R> {
    /// Create a generator rendering against `context`
    #[must_use]
    pub fn new(renderer: Arc<R>, context: Arc<Value>) -> Self {
        Self {
            renderer,
            context,
            filter: NameFilter::default(),
        }
    }

    /// Never write files with these destination basenames
    #[must_use]
    pub fn exclude<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.filter.exclude(names);
        self
    }

    /// Only write files with these destination basenames
    ///
    /// An empty list means no restriction.
    #[must_use]
    pub fn include<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.filter.include(names);
        self
    }

    /// Mirror `source_dir` into `dest_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the destination root cannot be created, or
    /// [`Error::Generation`] with every failure if any entry failed
    pub async fn generate(
        &self,
        source_dir: impl AsRef<Path>,
        dest_dir: impl AsRef<Path>,
    ) -> Result<GenerateReport> {
        let source_dir = source_dir.as_ref().to_path_buf();
        let dest_dir = dest_dir.as_ref().to_path_buf();

        fs::create_dir_all(&dest_dir)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: dest_dir.clone(),
                source,
            })?;

        info!(
            source = %source_dir.display(),
            destination = %dest_dir.display(),
            "Generating destination tree"
        );

        let walk = Arc::new(Walk {
            renderer: Arc::clone(&self.renderer),
            context: Arc::clone(&self.context),
            filter: self.filter.clone(),
        });

        let outcome = walk_dir(walk, source_dir, dest_dir, PathBuf::new()).await;
        if !outcome.failures.is_empty() {
            return Err(Error::Generation {
                failures: outcome.failures,
            });
        }

        info!(
            rendered = outcome.report.rendered,
            copied = outcome.report.copied,
            skipped = outcome.report.skipped,
            directories = outcome.report.directories,
            "Generation complete"
        );
        Ok(outcome.report)
    }
}

/// Spawn one task per entry of `source_dir` and join them all
fn walk_dir<R: TemplateRenderer + 'static>(
    walk: Arc<Walk<R>>,
    source_dir: PathBuf,
    dest_dir: PathBuf,
    relative: PathBuf,
) -> BoxFuture<Outcome> {
    Box::pin(async move {
        let mut outcome = Outcome::default();

        let mut entries = match fs::read_dir(&source_dir).await {
            Ok(entries) => entries,
            Err(source) => {
                return Outcome::failed(Error::DirectoryRead {
                    path: source_dir,
                    source,
                });
            }
        };

        let mut tasks = JoinSet::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    outcome.failures.push(Error::DirectoryRead {
                        path: source_dir.clone(),
                        source,
                    });
                    break;
                }
            };

            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            // Follows symlinks
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(source) => {
                    outcome.failures.push(Error::FileRead { path, source });
                    continue;
                }
            };

            if metadata.is_dir() {
                let child_dest = dest_dir.join(&name);
                let child_relative = relative.join(&name);
                let walk = Arc::clone(&walk);
                outcome.report.directories += 1;

                tasks.spawn(async move {
                    if let Err(source) = fs::create_dir_all(&child_dest).await {
                        return Outcome::failed(Error::DirectoryCreate {
                            path: child_dest,
                            source,
                        });
                    }
                    walk_dir(walk, path, child_dest, child_relative).await
                });
                continue;
            }

            let task = FileTask::plan(&source_dir, &dest_dir, &relative, &name);
            if !walk.filter.is_eligible(task.destination_name()) {
                debug!(path = %task.relative.display(), "Skipping filtered file");
                outcome.report.skipped += 1;
                continue;
            }

            let walk = Arc::clone(&walk);
            tasks.spawn(async move { Outcome::from_file(process_file(&walk, &task).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(child) => outcome.merge(child),
                Err(e) => outcome.failures.push(Error::Join(e)),
            }
        }

        outcome
    })
}

/// Render or copy a single file, then restrict its permissions
async fn process_file<R: TemplateRenderer>(walk: &Walk<R>, task: &FileTask) -> Result<TaskKind> {
    let bytes = fs::read(&task.source)
        .await
        .map_err(|source| Error::FileRead {
            path: task.source.clone(),
            source,
        })?;

    let contents = match task.kind {
        TaskKind::Copy => bytes,
        TaskKind::Render => render_file(walk, task, bytes)?.into_bytes(),
    };

    write_output(&task.destination, &contents).await?;

    debug!(
        source = %task.relative.display(),
        destination = %task.destination.display(),
        kind = ?task.kind,
        bytes = contents.len(),
        "Wrote file"
    );
    Ok(task.kind)
}

fn render_file<R: TemplateRenderer>(
    walk: &Walk<R>,
    task: &FileTask,
    bytes: Vec<u8>,
) -> Result<String> {
    let template = String::from_utf8(bytes).map_err(|source| Error::InvalidUtf8 {
        path: task.source.clone(),
        source,
    })?;

    let name = task.relative.to_string_lossy();
    let rendered = walk
        .renderer
        .render_named(&name, &template, &walk.context)
        .map_err(|e| Error::TemplateRender {
            path: name.to_string(),
            message: sanitize(&e.to_string()),
        })?;

    if task.is_json() {
        reformat_json(&task.destination, rendered)
    } else {
        Ok(rendered)
    }
}

/// Re-serialize rendered JSON with two-space indentation
fn reformat_json(destination: &Path, raw: String) -> Result<String> {
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(parsed) => serde_json::to_string_pretty(&parsed).map_err(|source| Error::JsonFormat {
            path: destination.to_path_buf(),
            raw,
            source,
        }),
        Err(source) => Err(Error::JsonFormat {
            path: destination.to_path_buf(),
            raw,
            source,
        }),
    }
}

/// Write `contents` to a file that is owner-only before any byte lands
async fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(OUTPUT_MODE);

    let mut file = options.open(path).await.map_err(write_error)?;
    // Files left by an earlier run keep their old mode on open
    restrict_permissions(&file, path).await?;
    file.write_all(contents).await.map_err(write_error)?;
    file.flush().await.map_err(write_error)
}

#[cfg(unix)]
async fn restrict_permissions(file: &fs::File, path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))
        .await
        .map_err(|source| Error::Permissions {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
async fn restrict_permissions(_file: &fs::File, _path: &Path) -> Result<()> {
    Ok(())
}
