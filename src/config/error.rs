//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations. Every
/// variant except the file errors means the invocation itself is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing required parameter.
    #[error("Missing required argument: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing parameter
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// Interface name cannot be used as part of a file name.
    #[error("Invalid interface name '{name}': {reason}")]
    InvalidInterface {
        /// The rejected name
        name: String,
        /// Reason for rejection
        reason: &'static str,
    },

    /// Protocol selector is not 4 or 6.
    #[error("Invalid protocol '{value}': expected 4 or 6")]
    InvalidProto {
        /// The invalid value provided
        value: String,
    },

    /// File name prefix contains a path separator.
    #[error("Invalid file prefix '{prefix}': must not contain '/'")]
    InvalidPrefix {
        /// The invalid prefix
        prefix: String,
    },
}

/// Well-known parameter names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The action parameter.
    pub const ACTION: &str = "action";
    /// The device parameter.
    pub const DEVICE: &str = "device";
    /// The ip parameter.
    pub const IP: &str = "ip";
    /// The proto parameter.
    pub const PROTO: &str = "proto";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required parameter.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
