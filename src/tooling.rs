//! Tooling
//!
//! Command-line access to the record store for scripting and inspection.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
