//! Command trait for nodeforge CLI
//!
//! Every subcommand implements [`Command`], receiving the shared
//! [`RuntimeContext`] with the loaded run configuration.

use crate::common::RuntimeContext;
use anyhow::Result;

/// Trait for all nodeforge commands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> anyhow::Result<()> {
///         // Access config: context.config
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
