//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use multimark::config::ConfigError;
use multimark::mime::MessageError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::run::RunError;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - bad config file, wrong value type, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - unreadable input, renderer failure, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileRead { .. } | ConfigError::TomlParse(_) => {
            eprintln!("\nRun 'multimark init' to generate a configuration template.");
        }
        ConfigError::TypeMismatch { .. } => {
            eprintln!("\nRun 'multimark init' to see the expected type of every key.");
        }
        ConfigError::InvalidOptionString { .. } => {
            eprintln!("\nQuote values that contain spaces, e.g. -a \"--attribute 'title=My Mail'\".");
        }
        _ => {}
    }
}

/// Prints helpful hints for common runtime errors.
pub fn print_run_hint(error: &RunError) {
    match error {
        RunError::Conversion(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("\n{hint}");
            }
        }
        RunError::Message(MessageError::UnsupportedStructure(_)) => {
            eprintln!("\nOnly single-part, multipart/mixed, multipart/alternative and multipart/related messages can be converted.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr; stdout is reserved for the output message.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
