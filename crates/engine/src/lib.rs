//! # Nodeforge Engine
//!
//! Generates a node's destination tree from a directory of templates.
//!
//! - **Tasks**: classification of source files into rendered templates and
//!   verbatim assets, plus include/exclude filtering
//! - **Generator**: concurrent, collect-all mirroring of the source tree with
//!   owner-only output permissions

pub mod error;
pub mod generator;
pub mod task;

pub use error::{Error, Result};
pub use generator::{GenerateReport, Generator, OUTPUT_MODE};
pub use task::{FileTask, NameFilter, TEMPLATE_MARKER, TaskKind};
