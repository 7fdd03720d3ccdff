//! multimark: lightweight-markup emails to multipart/alternative
//!
//! Entry point for the multimark application.

use multimark::config::{self, Cli, Command, Settings, write_default_config};
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, print_run_hint, setup_tracing};
use run::RunError;

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Some(Command::Init { output }) = &cli.command {
        return handle_init(output);
    }

    // Logging first so that config warnings are visible
    setup_tracing(cli.verbose);

    let settings = match config::load(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    tracing::info!("{settings}");

    run_application(settings)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs one conversion with the given settings.
///
/// Excluded from coverage - requires async runtime and external renderers.
#[cfg(not(tarpaulin_include))]
fn run_application(settings: Settings) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(settings)) {
        Ok(()) => exit_code::SUCCESS,
        Err(RunError::Path(e)) => {
            eprintln!("Configuration error: {e}");
            exit_code::CONFIG_ERROR
        }
        Err(e) => {
            tracing::error!("{e}");
            print_run_hint(&e);
            exit_code::runtime_error()
        }
    }
}
