//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Netplan configuration editor
///
/// Edits the netplan document of one interface and applies it with
/// `netplan generate` and `netplan apply`.
#[derive(Debug, Parser)]
#[command(name = "netplan-cfg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Action to perform (required unless a subcommand is given)
    #[arg(short, long, value_enum)]
    pub action: Option<ActionArg>,

    /// Interface name (required unless a subcommand is given)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Addresses for set_ip/set_gateway, or a route token (or remove/remove6) for set_route
    #[arg(short, long, allow_hyphen_values = true)]
    pub ip: Option<String>,

    /// Protocol: 4 or 6 for get_dhcp, digits such as "46" for set_dhcp
    #[arg(short, long)]
    pub proto: Option<String>,

    /// Option tokens for set_ip, separated by spaces (dhcp, dhcp6)
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub options: String,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory holding netplan documents
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// File name prefix of managed documents
    #[arg(long)]
    pub prefix: Option<String>,

    /// Path to the netplan executable
    #[arg(long = "netplan", value_name = "PROGRAM")]
    pub netplan: Option<PathBuf>,

    /// Print the resulting document instead of saving and applying it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for netplan-cfg
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "netplan-cfg.toml")]
        output: PathBuf,
    },
}

/// Action argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Query the DHCP flag (exit 0 enabled, 1 disabled, 2 unset)
    #[value(name = "get_dhcp")]
    GetDhcp,
    /// Run netplan generate and apply
    #[value(name = "restart")]
    Restart,
    /// Reset the interface to DHCP
    #[value(name = "set_dhcp")]
    SetDhcp,
    /// Set default gateways
    #[value(name = "set_gateway")]
    SetGateway,
    /// Reset the interface to static addresses
    #[value(name = "set_ip")]
    SetIp,
    /// Add or remove routes
    #[value(name = "set_route")]
    SetRoute,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
