//! Core behavioral traits for nodeforge components
//!
//! The generator depends on this trait instead of the concrete template engine,
//! which keeps `nodeforge-engine` testable with a stub renderer.

use crate::value::Value;

/// Template renderer interface
///
/// # Examples
///
/// ```ignore
/// fn render_greeting(renderer: &dyn TemplateRenderer, ctx: &Value) -> Result<String, _> {
///     renderer.render_named("greeting.txt", "Hello {{ name }}!", ctx)
/// }
/// ```
pub trait TemplateRenderer: Send + Sync {
    /// Error type for rendering operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Render a template with a name used in error locations
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to compile or execute.
    fn render_named(&self, name: &str, template: &str, context: &Value)
    -> Result<String, Self::Error>;
}
