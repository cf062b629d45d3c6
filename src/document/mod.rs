//! In-memory netplan document for a single interface.
//!
//! A document owns exactly one interface entry, the one named at load
//! time. Other sections under `network` (`vlans`, `bridges`, ...) are
//! carried through untouched until a reset discards them. Mutations mirror
//! the actions of the command line:
//!
//! | Operation                          | Effect on the entry                             |
//! |------------------------------------|-------------------------------------------------|
//! | [`NetplanDocument::set_gateway`]   | writes `gateway4`/`gateway6`, **drops `routes`** |
//! | [`NetplanDocument::set_dhcp`]      | **resets the document**, enables DHCP flags      |
//! | [`NetplanDocument::set_route`]     | adds (deduplicated) or removes routes            |
//! | [`NetplanDocument::set_ip`]        | **resets the document**, writes addresses, DHCP  |
//!
//! The resets and the gateway/routes coupling assume callers that always
//! send the complete desired state of the interface.

mod interface;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use interface::InterfaceConfig;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{AddressError, IpFamily, Route, RouteParseError, to_cidr};

/// Netplan schema version written into every document.
pub const NETPLAN_VERSION: u32 = 2;

/// Payload token that removes IPv4 routes (and is skipped elsewhere).
pub const REMOVE: &str = "remove";

/// Payload token that removes IPv6 routes (and is skipped elsewhere).
pub const REMOVE6: &str = "remove6";

/// Option token enabling DHCPv4 in [`NetplanDocument::set_ip`].
pub const OPTION_DHCP: &str = "dhcp";

/// Option token enabling DHCPv6 in [`NetplanDocument::set_ip`].
pub const OPTION_DHCP6: &str = "dhcp6";

/// Errors converting a document from or to YAML.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text is not a valid netplan document.
    #[error("Invalid netplan YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The document could not be rendered as YAML.
    #[error("Failed to serialize netplan document: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// The document declares a schema version other than 2.
    #[error("Unsupported netplan version {0}: expected {NETPLAN_VERSION}")]
    UnsupportedVersion(u32),

    /// The document configures an interface other than its own.
    #[error("Document for '{expected}' also configures interface '{found}'")]
    ForeignInterface {
        /// Interface the document was loaded for.
        expected: String,
        /// Unexpected interface found under `ethernets`.
        found: String,
    },
}

/// Tri-state answer of [`NetplanDocument::dhcp_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpState {
    /// The flag is present and true.
    Enabled,
    /// The flag is present and false.
    Disabled,
    /// The flag is absent.
    Unset,
}

impl DhcpState {
    /// Process exit code reported by `get_dhcp`: 0, 1 or 2.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Enabled => 0,
            Self::Disabled => 1,
            Self::Unset => 2,
        }
    }
}

impl fmt::Display for DhcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Unset => write!(f, "unset"),
        }
    }
}

/// Result of [`NetplanDocument::set_route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteUpdate {
    /// The route was appended.
    Added(Route),
    /// An identical route already existed; nothing changed.
    AlreadyPresent(Route),
    /// Routes of a family were removed.
    Removed {
        /// Family whose routes were removed.
        family: IpFamily,
        /// Number of records removed.
        count: usize,
    },
}

/// A netplan document holding one interface entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NetplanDocument {
    interface: String,
    renderer: Option<String>,
    entry: InterfaceConfig,
    /// Other sections under `network` (`vlans`, `bridges`, ...), kept verbatim.
    sections: BTreeMap<String, serde_yaml::Value>,
}

impl NetplanDocument {
    /// Creates the skeleton document: version marker and an empty entry.
    #[must_use]
    pub fn skeleton(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            renderer: None,
            entry: InterfaceConfig::default(),
            sections: BTreeMap::new(),
        }
    }

    /// Parses a document for `interface` from YAML text.
    ///
    /// A document without an entry for `interface` gets an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the YAML is invalid, declares another
    /// schema version, or configures other interfaces.
    pub fn from_yaml(interface: &str, text: &str) -> Result<Self, DocumentError> {
        let raw: RawDocument = serde_yaml::from_str(text).map_err(DocumentError::Parse)?;
        let RawNetwork {
            version,
            renderer,
            mut ethernets,
            sections,
        } = raw.network;

        if version != NETPLAN_VERSION {
            return Err(DocumentError::UnsupportedVersion(version));
        }

        let entry = ethernets.remove(interface);
        if let Some(found) = ethernets.into_keys().next() {
            return Err(DocumentError::ForeignInterface {
                expected: interface.to_string(),
                found,
            });
        }

        let entry = entry.map_or_else(
            || {
                tracing::warn!("No entry for {interface} in document, starting from an empty one");
                InterfaceConfig::default()
            },
            Option::unwrap_or_default,
        );

        Ok(Self {
            interface: interface.to_string(),
            renderer,
            entry,
            sections,
        })
    }

    /// Renders the document as netplan YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialize`] if rendering fails.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        let file = DocumentRef {
            network: NetworkRef {
                version: NETPLAN_VERSION,
                renderer: self.renderer.as_deref(),
                ethernets: BTreeMap::from([(self.interface.as_str(), &self.entry)]),
                sections: &self.sections,
            },
        };
        serde_yaml::to_string(&file).map_err(DocumentError::Serialize)
    }

    /// Name of the interface this document configures.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// The interface entry.
    #[must_use]
    pub const fn entry(&self) -> &InterfaceConfig {
        &self.entry
    }

    /// Sets default gateways from address tokens.
    ///
    /// Each token is classified as IPv6 if it contains `:`, IPv4 otherwise,
    /// and overwrites the gateway of that family. Tokens containing
    /// `remove` are ignored. Writing any gateway deletes the `routes` key.
    pub fn set_gateway<'a, I>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for address in addresses {
            if address.contains(REMOVE) {
                tracing::debug!("Ignoring gateway token '{address}'");
                continue;
            }

            let family = if IpFamily::V6.matches(address) {
                IpFamily::V6
            } else {
                IpFamily::V4
            };

            if let Some(routes) = self.entry.routes.take() {
                tracing::info!(
                    "Setting {} on {} drops {} route(s)",
                    family.gateway_key(),
                    self.interface,
                    routes.len()
                );
            }

            self.entry.set_gateway(family, address.to_string());
        }
    }

    /// Replaces the document with a skeleton that only enables DHCP.
    ///
    /// Every `4` in `protocols` enables `dhcp4`, every `6` enables `dhcp6`;
    /// other characters are ignored. All prior settings are discarded,
    /// including `renderer` and other `network` sections.
    pub fn set_dhcp(&mut self, protocols: &str) {
        self.reset();

        for proto in protocols.chars() {
            match proto {
                '4' => self.entry.set_dhcp(IpFamily::V4, true),
                '6' => self.entry.set_dhcp(IpFamily::V6, true),
                _ => {}
            }
        }
    }

    /// Adds a route from a compact token, or removes routes by family.
    ///
    /// The `routes` key is created if missing. `remove` deletes every route
    /// whose destination looks IPv4, `remove6` every IPv6 one. Any other
    /// token is parsed as `<to>=<via>[m<metric>]` and appended unless an
    /// identical route is already present.
    ///
    /// # Errors
    ///
    /// Returns [`RouteParseError`] if the token is malformed; the document
    /// is left unchanged in that case.
    pub fn set_route(&mut self, token: &str) -> Result<RouteUpdate, RouteParseError> {
        let removal = match token {
            REMOVE => Some(IpFamily::V4),
            REMOVE6 => Some(IpFamily::V6),
            _ => None,
        };

        if let Some(family) = removal {
            let routes = self.entry.routes.get_or_insert_with(Vec::new);
            let before = routes.len();
            routes.retain(|route| !family.matches(&route.to));
            return Ok(RouteUpdate::Removed {
                family,
                count: before - routes.len(),
            });
        }

        let route = Route::parse(token)?;
        let routes = self.entry.routes.get_or_insert_with(Vec::new);
        if routes.contains(&route) {
            return Ok(RouteUpdate::AlreadyPresent(route));
        }
        routes.push(route.clone());
        Ok(RouteUpdate::Added(route))
    }

    /// Replaces the document with a skeleton holding a static address
    /// configuration.
    ///
    /// Each token except `remove`/`remove6` is normalised to CIDR (see
    /// [`to_cidr`]) and appended to `addresses`. Both DHCP flags are then
    /// written as false, and re-enabled by the `dhcp`/`dhcp6` options.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] if a dotted netmask cannot be converted;
    /// the document is left unchanged in that case.
    pub fn set_ip<'a, A, O>(&mut self, addresses: A, options: O) -> Result<(), AddressError>
    where
        A: IntoIterator<Item = &'a str>,
        O: IntoIterator<Item = &'a str>,
    {
        let addresses = addresses
            .into_iter()
            .filter(|token| *token != REMOVE && *token != REMOVE6)
            .map(to_cidr)
            .collect::<Result<Vec<_>, _>>()?;

        self.reset();
        self.entry.addresses = addresses;
        self.entry.set_dhcp(IpFamily::V4, false);
        self.entry.set_dhcp(IpFamily::V6, false);

        for option in options {
            match option {
                OPTION_DHCP => self.entry.set_dhcp(IpFamily::V4, true),
                OPTION_DHCP6 => self.entry.set_dhcp(IpFamily::V6, true),
                other => tracing::debug!("Ignoring unknown option '{other}'"),
            }
        }

        Ok(())
    }

    /// Reports whether DHCP is enabled, disabled or unset for `family`.
    #[must_use]
    pub const fn dhcp_state(&self, family: IpFamily) -> DhcpState {
        match self.entry.dhcp(family) {
            Some(true) => DhcpState::Enabled,
            Some(false) => DhcpState::Disabled,
            None => DhcpState::Unset,
        }
    }

    /// Starts over from the skeleton, as if no document existed.
    fn reset(&mut self) {
        let fresh = Self::skeleton(self.interface.clone());
        if *self != fresh {
            tracing::debug!("Discarding previous configuration of {}", self.interface);
        }
        *self = fresh;
    }
}

/// On-disk layout, read side. Entries may be YAML null (`eth0:`).
#[derive(Deserialize)]
struct RawDocument {
    network: RawNetwork,
}

#[derive(Deserialize)]
struct RawNetwork {
    version: u32,
    #[serde(default)]
    renderer: Option<String>,
    #[serde(default)]
    ethernets: BTreeMap<String, Option<InterfaceConfig>>,
    #[serde(flatten)]
    sections: BTreeMap<String, serde_yaml::Value>,
}

/// On-disk layout, write side.
#[derive(Serialize)]
struct DocumentRef<'a> {
    network: NetworkRef<'a>,
}

#[derive(Serialize)]
struct NetworkRef<'a> {
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    renderer: Option<&'a str>,
    ethernets: BTreeMap<&'a str, &'a InterfaceConfig>,
    #[serde(flatten)]
    sections: &'a BTreeMap<String, serde_yaml::Value>,
}
