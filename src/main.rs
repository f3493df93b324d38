//! os-specific - resolve OS-conditional lookup terms from the command line
//!
//! This is the main entry point for the `os-specific` CLI.

use anyhow::{Context, Result};
use rustible_os_specific::cli::{self, output, Cli};
use rustible_os_specific::config::Config;
use rustible_os_specific::logging;

fn main() {
    let cli = Cli::parse_args();

    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            output::print_error(&format!("{:#}", e), !cli.no_color);
            1
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    logging::init_logging(&config.logging, cli.verbose).context("Failed to initialize logging")?;
    tracing::debug!(version = rustible_os_specific::version(), "Starting os-specific");

    let values = cli::execute(cli, &config).context("os_specific lookup failed")?;
    let rendered = output::render(&values, cli.output)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }

    Ok(())
}
