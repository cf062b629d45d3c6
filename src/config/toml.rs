//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Netplan location and tooling
    #[serde(default)]
    pub netplan: NetplanSection,

    /// Logging configuration
    #[serde(default)]
    pub log: LogSection,
}

/// Netplan configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetplanSection {
    /// Directory holding netplan documents
    pub config_dir: Option<PathBuf>,

    /// File name prefix of managed documents
    pub file_prefix: Option<String>,

    /// Netplan executable
    pub command: Option<PathBuf>,
}

/// Logging configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Enable debug logging
    #[serde(default)]
    pub verbose: bool,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# netplan-cfg configuration file
# Command-line flags override every value below.

[netplan]
# Directory holding netplan documents (default: /etc/netplan)
# config_dir = "/etc/netplan"

# File name prefix of managed documents (default: 90-vz-)
# The document for eth0 is <config_dir>/<file_prefix>eth0.yaml
# file_prefix = "90-vz-"

# Netplan executable (default: netplan, looked up in PATH)
# command = "/usr/sbin/netplan"

[log]
# Enable debug logging, including netplan output (same as --verbose)
# verbose = false
"#
    .to_string()
}
