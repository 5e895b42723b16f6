//! CLI command implementations
//!
//! This module contains all command implementations for the nodeforge CLI.

pub mod generate;
pub mod resolve;
