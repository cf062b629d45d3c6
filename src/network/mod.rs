//! Address and route primitives shared by the document layer.
//!
//! This module provides:
//! - Address family classification ([`IpFamily`], [`is_family`])
//! - Netmask and CIDR normalisation ([`netmask_to_prefix_len`], [`to_cidr`])
//! - Route records and compact route tokens ([`Route`])

mod address;
mod route;

pub use address::{AddressError, IpFamily, is_family, netmask_to_prefix_len, to_cidr};
pub use route::{Route, RouteParseError};
