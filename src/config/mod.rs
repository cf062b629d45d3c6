//! Configuration layer for netplan-cfg.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Settings are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The per-invocation arguments (`action`, `device`, `ip`, `proto`,
//! `options`) are CLI-only. The config file only locates documents and the
//! netplan executable.
//!
//! # Boolean Flag Semantics
//!
//! `--verbose` uses OR semantics with `log.verbose`: set in either place, it
//! is on. `--dry-run` is CLI-only.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{ActionArg, Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
