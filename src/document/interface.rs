//! The configuration entry of a single ethernet interface.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::network::{IpFamily, Route};

/// Settings for one interface under `network.ethernets`.
///
/// Only the keys this tool edits are typed. Any other key found in an
/// existing file (`nameservers`, `mtu`, ...) is kept in `extra` and
/// written back untouched unless the entry is reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(super) addresses: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) gateway4: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) gateway6: Option<String>,

    // Written as `true`/`false`, where older tools wrote `"yes"`/`"no"`.
    // netplan reads both; `deserialize_flag` accepts either form.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_flag"
    )]
    pub(super) dhcp4: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_flag"
    )]
    pub(super) dhcp6: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) routes: Option<Vec<Route>>,

    #[serde(flatten)]
    pub(super) extra: BTreeMap<String, serde_yaml::Value>,
}

impl InterfaceConfig {
    /// Addresses in CIDR notation, in insertion order.
    #[must_use]
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Default gateway for `family`, if set.
    #[must_use]
    pub fn gateway(&self, family: IpFamily) -> Option<&str> {
        match family {
            IpFamily::V4 => self.gateway4.as_deref(),
            IpFamily::V6 => self.gateway6.as_deref(),
        }
    }

    /// DHCP flag for `family`; `None` when the key is absent.
    #[must_use]
    pub const fn dhcp(&self, family: IpFamily) -> Option<bool> {
        match family {
            IpFamily::V4 => self.dhcp4,
            IpFamily::V6 => self.dhcp6,
        }
    }

    /// Static routes; `None` when the `routes` key is absent.
    #[must_use]
    pub fn routes(&self) -> Option<&[Route]> {
        self.routes.as_deref()
    }

    /// Keys this tool does not manage.
    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, serde_yaml::Value> {
        &self.extra
    }

    /// Returns true if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(super) fn set_gateway(&mut self, family: IpFamily, address: String) {
        match family {
            IpFamily::V4 => self.gateway4 = Some(address),
            IpFamily::V6 => self.gateway6 = Some(address),
        }
    }

    pub(super) fn set_dhcp(&mut self, family: IpFamily, enabled: bool) {
        match family {
            IpFamily::V4 => self.dhcp4 = Some(enabled),
            IpFamily::V6 => self.dhcp6 = Some(enabled),
        }
    }
}

/// DHCP flag as found on disk: a YAML boolean, or a `yes`/`no` style string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawFlag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawFlag::Bool(value)) => Ok(Some(value)),
        Some(RawFlag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "on" => Ok(Some(true)),
            "no" | "n" | "false" | "off" => Ok(Some(false)),
            _ => Err(de::Error::custom(format!(
                "'{text}' is not a boolean (expected true/false or yes/no)"
            ))),
        },
    }
}
