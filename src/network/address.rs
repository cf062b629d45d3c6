//! Address family classification and netmask conversion.
//!
//! Both helpers are syntactic: they never validate that a
//! string is a well-formed address. Callers use them to pick a branch
//! (`gateway4` vs `gateway6`, `/32` vs `/64`), not to reject input.

use std::fmt;

use thiserror::Error;

/// Address family selected by a `proto` argument or inferred from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    /// IPv4 (`4`).
    V4,
    /// IPv6 (`6`).
    V6,
}

impl IpFamily {
    /// Parses a protocol selector such as `4`, `6`, `ipv4` or `v6`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::UnknownFamily`] for any other value.
    pub fn from_proto(proto: &str) -> Result<Self, AddressError> {
        match proto.trim().to_ascii_lowercase().as_str() {
            "4" | "v4" | "ipv4" | "inet" => Ok(Self::V4),
            "6" | "v6" | "ipv6" | "inet6" => Ok(Self::V6),
            _ => Err(AddressError::UnknownFamily(proto.to_string())),
        }
    }

    /// Returns true if `address` textually belongs to this family.
    ///
    /// IPv4 is recognised by a `.`, IPv6 by a `:`. An IPv4-mapped IPv6
    /// address (`::ffff:1.2.3.4`) therefore matches both families.
    #[must_use]
    pub fn matches(self, address: &str) -> bool {
        match self {
            Self::V4 => address.contains('.'),
            Self::V6 => address.contains(':'),
        }
    }

    /// Implicit prefix length appended to a bare address of this family.
    #[must_use]
    pub const fn host_prefix_len(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 64,
        }
    }

    /// Document key holding the default gateway for this family.
    #[must_use]
    pub const fn gateway_key(self) -> &'static str {
        match self {
            Self::V4 => "gateway4",
            Self::V6 => "gateway6",
        }
    }

    /// Document key holding the DHCP flag for this family.
    #[must_use]
    pub const fn dhcp_key(self) -> &'static str {
        match self {
            Self::V4 => "dhcp4",
            Self::V6 => "dhcp6",
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// Errors raised while interpreting address text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The protocol selector is neither IPv4 nor IPv6.
    #[error("Unknown protocol '{0}': expected 4 or 6")]
    UnknownFamily(String),

    /// A netmask octet is not a decimal number.
    #[error("Invalid netmask '{netmask}': octet '{octet}' is not a number")]
    InvalidNetmask {
        /// The full netmask text.
        netmask: String,
        /// The offending octet.
        octet: String,
    },
}

/// Returns true if `address` textually matches `family`.
#[must_use]
pub fn is_family(address: &str, family: IpFamily) -> bool {
    family.matches(address)
}

/// Converts a dotted netmask to a prefix length by counting set bits.
///
/// Contiguity is not checked: `255.0.255.0` yields 16.
///
/// # Errors
///
/// Returns [`AddressError::InvalidNetmask`] if an octet is not a number.
pub fn netmask_to_prefix_len(netmask: &str) -> Result<u32, AddressError> {
    netmask.split('.').try_fold(0, |bits, octet| {
        octet
            .trim()
            .parse::<u32>()
            .map(|value| bits + value.count_ones())
            .map_err(|_| AddressError::InvalidNetmask {
                netmask: netmask.to_string(),
                octet: octet.to_string(),
            })
    })
}

/// Rewrites an address token into the CIDR form netplan expects.
///
/// - A bare address gets the family's host prefix (`/32` or `/64`).
///   Anything without a `.` is treated as IPv6.
/// - An IPv4 address with a dotted netmask suffix has the mask replaced
///   by its prefix length.
/// - Everything else passes through unchanged.
///
/// # Errors
///
/// Returns [`AddressError::InvalidNetmask`] if a dotted suffix has a
/// non-numeric octet.
pub fn to_cidr(address: &str) -> Result<String, AddressError> {
    let Some((host, suffix)) = address.split_once('/') else {
        let family = if IpFamily::V4.matches(address) {
            IpFamily::V4
        } else {
            IpFamily::V6
        };
        return Ok(format!("{address}/{}", family.host_prefix_len()));
    };

    if IpFamily::V4.matches(address) && suffix.contains('.') {
        let prefix_len = netmask_to_prefix_len(suffix)?;
        return Ok(format!("{host}/{prefix_len}"));
    }

    Ok(address.to_string())
}
