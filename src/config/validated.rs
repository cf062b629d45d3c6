//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::action::Action;
use crate::network::IpFamily;

use super::cli::{ActionArg, Cli};
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Characters that cannot appear in an interface name used as a file name part.
static FORBIDDEN_INTERFACE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\s\x00]").expect("static pattern compiles"));

/// Fully validated configuration ready for use by the application.
///
/// Holds the target interface, the typed action with its payload, and the
/// settings that locate netplan documents and the netplan executable.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Interface whose document is edited
    pub interface: String,

    /// Action with its parsed arguments
    pub action: Action,

    /// Directory holding netplan documents
    pub config_dir: PathBuf,

    /// File name prefix of managed documents
    pub file_prefix: String,

    /// Netplan executable
    pub netplan_command: PathBuf,

    /// Dry-run mode (print the document instead of saving and applying)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ action: {}, interface: {}, config_dir: {}, file_prefix: {}, netplan: {}, \
             dry_run: {} }}",
            self.action,
            self.interface,
            self.config_dir.display(),
            self.file_prefix,
            self.netplan_command.display(),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`action`, `device`, and `ip` or `proto`
    ///   where the action needs them)
    /// - The interface name cannot be embedded in a file name
    /// - The protocol selector of `get_dhcp` is not 4 or 6
    /// - The file prefix contains a path separator
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let action_arg = cli.action.ok_or_else(|| {
            ConfigError::missing(
                field::ACTION,
                "Use -a/--action with one of get_dhcp, restart, set_dhcp, set_gateway, set_ip, set_route",
            )
        })?;

        let interface = Self::resolve_interface(cli)?;
        let action = Self::resolve_action(action_arg, cli)?;
        let file_prefix = Self::resolve_file_prefix(cli, toml)?;

        let config_dir = cli
            .config_dir
            .clone()
            .or_else(|| toml.and_then(|t| t.netplan.config_dir.clone()))
            .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_DIR));

        let netplan_command = cli
            .netplan
            .clone()
            .or_else(|| toml.and_then(|t| t.netplan.command.clone()))
            .unwrap_or_else(|| PathBuf::from(defaults::NETPLAN_COMMAND));

        Ok(Self {
            interface,
            action,
            config_dir,
            file_prefix,
            netplan_command,
            dry_run: cli.dry_run,
            verbose: cli.verbose || toml.is_some_and(|t| t.log.verbose),
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_interface(cli: &Cli) -> Result<String, ConfigError> {
        let name = cli
            .device
            .as_deref()
            .ok_or_else(|| ConfigError::missing(field::DEVICE, "Use -d/--device"))?;

        validate_interface(name)?;
        Ok(name.to_string())
    }

    fn resolve_action(arg: ActionArg, cli: &Cli) -> Result<Action, ConfigError> {
        let action = match arg {
            ActionArg::GetDhcp => {
                let proto = cli.proto.as_deref().unwrap_or(defaults::GET_DHCP_PROTO);
                let family =
                    IpFamily::from_proto(proto).map_err(|_| ConfigError::InvalidProto {
                        value: proto.to_string(),
                    })?;
                Action::GetDhcp { family }
            }
            ActionArg::Restart => Action::Restart,
            ActionArg::SetDhcp => {
                let protocols = cli
                    .proto
                    .clone()
                    .ok_or_else(|| ConfigError::missing(field::PROTO, "Use -p/--proto"))?;
                Action::SetDhcp { protocols }
            }
            ActionArg::SetGateway => Action::SetGateway {
                addresses: split_tokens(required_ip(cli)?),
            },
            ActionArg::SetIp => Action::SetIp {
                addresses: split_tokens(required_ip(cli)?),
                options: split_tokens(&cli.options),
            },
            ActionArg::SetRoute => Action::SetRoute {
                token: required_ip(cli)?.trim().to_string(),
            },
        };

        Ok(action)
    }

    fn resolve_file_prefix(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let prefix = cli
            .prefix
            .clone()
            .or_else(|| toml.and_then(|t| t.netplan.file_prefix.clone()))
            .unwrap_or_else(|| defaults::FILE_PREFIX.to_string());

        if prefix.contains('/') {
            return Err(ConfigError::InvalidPrefix { prefix });
        }

        Ok(prefix)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn required_ip(cli: &Cli) -> Result<&str, ConfigError> {
    cli.ip
        .as_deref()
        .ok_or_else(|| ConfigError::missing(field::IP, "Use -i/--ip"))
}

fn split_tokens(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn validate_interface(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be a relative path component")
    } else if name.len() > defaults::MAX_INTERFACE_LEN {
        Some("must be at most 15 bytes")
    } else if FORBIDDEN_INTERFACE_CHARS.is_match(name) {
        Some("must not contain '/', whitespace or NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidInterface {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
