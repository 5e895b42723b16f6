//! Template engine implementation
//!
//! The engine wraps a minijinja environment with the node helper set
//! registered as functions and filters.

use crate::formatters::{MemoryProbe, SystemMemory};
use crate::functions;
use crate::{Error, Result, error_location};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use nodeforge_core::Value;
use nodeforge_core::sanitize::{sanitize, sanitize_value};
use std::error::Error as _;
use std::fmt::Write as _;
use std::sync::Arc;

/// Template engine for rendering node configuration templates
pub struct TemplateEngine {
    /// The minijinja environment
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine that sizes memory against the host
    #[must_use]
    pub fn new() -> Self {
        Self::with_memory_probe(Arc::new(SystemMemory))
    }

    /// Create an engine with a custom memory source for `memoryFraction`
    ///
    /// # Examples
    ///
    /// ```
    /// use nodeforge_template::{FixedMemory, TemplateEngine};
    /// use nodeforge_core::Value;
    /// use std::sync::Arc;
    ///
    /// let engine = TemplateEngine::with_memory_probe(Arc::new(FixedMemory(4096)));
    /// let out = engine.render("{{ memoryFraction(25) }}", &Value::mapping()).unwrap();
    /// assert_eq!(out, "1024");
    /// ```
    #[must_use]
    pub fn with_memory_probe(probe: Arc<dyn MemoryProbe>) -> Self {
        let mut env = Environment::new();

        // A missing key is an error, never an empty string
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_function("groupedInteger", functions::grouped_integer);
        env.add_function("toHex", functions::to_hex);
        env.add_function("toSimpleHex", functions::to_simple_hex);
        env.add_function("toJson", functions::to_json);
        env.add_function("splitCsv", functions::split_csv);
        env.add_function("add", functions::add);
        env.add_function("subtract", functions::subtract);
        env.add_function("durationToSeconds", functions::duration_to_seconds);
        env.add_function("memoryFraction", move |percentage: &minijinja::Value| {
            functions::memory_fraction(percentage, probe.as_ref())
        });

        // Unary helpers double as filters
        env.add_filter("groupedInteger", functions::grouped_integer);
        env.add_filter("toHex", functions::to_hex);
        env.add_filter("toSimpleHex", functions::to_simple_hex);
        env.add_filter("toJson", functions::to_json);
        env.add_filter("splitCsv", functions::split_csv);
        env.add_filter("durationToSeconds", functions::duration_to_seconds);

        Self { env }
    }

    /// Render a template string against a context
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the template fails to compile or execute
    pub fn render(&self, template: &str, context: &Value) -> Result<String> {
        self.render_named("<string>", template, context)
    }

    /// Render a template with a name used in error locations
    ///
    /// The generator passes the template's path relative to the source
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the template fails to compile or execute
    pub fn render_named(&self, name: &str, template: &str, context: &Value) -> Result<String> {
        self.env
            .render_named_str(name, template, context)
            .map_err(|e| render_error(&e, template, context))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl nodeforge_core::TemplateRenderer for TemplateEngine {
    type Error = Error;

    fn render_named(&self, name: &str, template: &str, context: &Value) -> Result<String> {
        Self::render_named(self, name, template, context)
    }
}

/// Build a sanitized render error
fn render_error(err: &minijinja::Error, template: &str, context: &Value) -> Error {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(message, "\n  caused by: {cause}");
        source = cause.source();
    }

    let location = error_location(err);
    let diagnostic = format!(
        "error: {}\nlocation: {}\ntemplate:\n{}\ncontext:\n{}",
        sanitize(&message),
        sanitize(&location),
        sanitize(template),
        sanitize(&sanitize_value(context).to_pretty_json()),
    );

    Error::Render {
        location: sanitize(&location),
        diagnostic,
    }
}
