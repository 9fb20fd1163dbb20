//! CLI command definitions using clap

use clap::{Parser, ValueEnum};

/// e2e-dump: inspect the accessibility tree of running applications
///
/// Without arguments, lists the applications registered on the desktop.
/// With an application name, prints that application's widget tree.
#[derive(Parser, Debug)]
#[command(name = "e2e-dump")]
#[command(author, version)]
pub struct Cli {
    /// Name of the application to dump
    pub app: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format for listings and dumps
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tree
    #[default]
    Text,
    /// JSON document
    Json,
}
