//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use netplan_cfg::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
///
/// Successful actions exit with the status of the action itself: the DHCP
/// state for `get_dhcp`, the failing netplan phase for reconciliation.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Invalid invocation (`EX_USAGE`): missing arguments, bad config file, etc.
    pub const CONFIG_ERROR: u8 = 64;

    /// Failure inside the tool (`EX_SOFTWARE`): unreadable document, failed save, etc.
    pub const RUNTIME_ERROR: u8 = 70;

    /// Exit code for configuration errors.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn config_error() -> ExitCode {
        ExitCode::from(CONFIG_ERROR)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingRequired { field: f, .. } => {
            if *f == field::ACTION || *f == field::DEVICE {
                eprintln!("\nRun 'netplan-cfg --help' for usage.");
            }
        }
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'netplan-cfg init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so that stdout carries only command output.
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
