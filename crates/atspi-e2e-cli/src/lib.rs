//! atspi-e2e CLI library
//!
//! Diagnostic commands for writing accessibility-tree tests: which
//! applications are on the desktop, and what their widget trees look like.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;

pub use commands::{Cli, OutputFormat};
pub use config::{init_tracing, CliConfig, Verbosity};
pub use error::{CliError, CliResult};
