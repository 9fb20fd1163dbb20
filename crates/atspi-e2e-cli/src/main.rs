//! e2e-dump: accessibility tree inspector
//!
//! ## Usage
//!
//! ```bash
//! e2e-dump                      # List applications on the desktop
//! e2e-dump contador             # Dump the widget tree of "contador"
//! e2e-dump --format json gedit  # Same, as JSON
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use atspi_e2e_cli::{init_tracing, Cli, CliConfig, CliResult};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    init_tracing(config.verbosity);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "atspi")]
fn run(config: &CliConfig) -> CliResult<()> {
    let desktop = atspi_e2e::AtspiDesktop::connect()?;
    let mut out = io::stdout().lock();
    atspi_e2e_cli::handlers::run(&desktop, config.app.as_deref(), config.format, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(not(feature = "atspi"))]
fn run(_config: &CliConfig) -> CliResult<()> {
    io::stdout().flush()?;
    Err(atspi_e2e_cli::CliError::unsupported(
        "built without the atspi feature, no accessibility backend available",
    ))
}
