//! Core types and utilities for nodeforge
//!
//! This is the foundation crate that all other nodeforge crates depend on.
//! It provides:
//! - The closed configuration [`Value`] model
//! - Secret redaction for diagnostics
//! - Base error types
//! - The [`TemplateRenderer`] seam used by the generator
//!
//! This crate has no dependencies on other nodeforge crates.

pub mod error;
pub mod sanitize;
pub mod traits;
pub mod value;

pub use error::{Error, Result};
pub use traits::TemplateRenderer;
pub use value::{Mapping, Value};
