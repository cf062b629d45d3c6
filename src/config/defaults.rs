//! Default values for configuration options.
//!
//! Centralized constants to avoid magic values scattered across the codebase.

/// Directory holding netplan documents.
pub const CONFIG_DIR: &str = "/etc/netplan";

/// File name prefix of documents managed by this tool.
///
/// The `90-` keeps these documents late in netplan's lexical merge order.
pub const FILE_PREFIX: &str = "90-vz-";

/// Netplan executable, resolved through `PATH`.
pub const NETPLAN_COMMAND: &str = "netplan";

/// Protocol queried by `get_dhcp` when none is given.
pub const GET_DHCP_PROTO: &str = "4";

/// Longest interface name the kernel accepts (`IFNAMSIZ - 1`).
pub const MAX_INTERFACE_LEN: usize = 15;
