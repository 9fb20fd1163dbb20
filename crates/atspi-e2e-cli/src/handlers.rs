//! Command handlers, generic over the desktop backend

use std::io::Write;

use atspi_e2e::dump::{dump_tree, find_application, list_applications, render_tree};
use atspi_e2e::Desktop;
use tracing::debug;

use crate::commands::OutputFormat;
use crate::error::CliResult;

/// Print the names of the desktop applications
pub fn run_list<D: Desktop>(desktop: &D, format: OutputFormat, out: &mut impl Write) -> CliResult<()> {
    let names = list_applications(desktop)?;
    debug!(count = names.len(), "listing desktop applications");
    match format {
        OutputFormat::Text => {
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &names)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Print the widget tree of application `name`.
///
/// An unknown application is reported on `out`; it is not an error.
pub fn run_dump<D: Desktop>(
    desktop: &D,
    name: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> CliResult<()> {
    let Some(app) = find_application(desktop, name)? else {
        writeln!(out, "App {name} not found in desktop")?;
        writeln!(out, "Try running e2e-dump without args to get the list of apps")?;
        return Ok(());
    };
    debug!(app = name, "dumping application tree");
    match format {
        OutputFormat::Text => write!(out, "{}", render_tree(&app)?)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &dump_tree(&app)?)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Dispatch to [`run_dump`] or [`run_list`]
pub fn run<D: Desktop>(
    desktop: &D,
    app: Option<&str>,
    format: OutputFormat,
    out: &mut impl Write,
) -> CliResult<()> {
    match app {
        Some(name) => run_dump(desktop, name, format, out),
        None => run_list(desktop, format, out),
    }
}
