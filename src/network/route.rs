//! Compact route tokens and the route record stored in the document.
//!
//! A route token packs destination, gateway and optional metric into one
//! argument: `<to>=<via>[m<metric>]`. Either `=` or `m` separates the
//! first two fields, so `10.0.0.0/24m10.0.0.1m100` is also accepted.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;

const SEPARATORS: [char; 2] = ['m', '='];

/// A static route entry under an interface's `routes` list.
///
/// Equality covers all three fields; two routes that differ only in
/// metric are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Destination network in CIDR notation.
    pub to: String,
    /// Next-hop gateway address.
    pub via: String,
    /// Route metric, omitted from the document when absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_metric"
    )]
    pub metric: Option<u32>,
}

impl Route {
    /// Creates a route without a metric.
    #[must_use]
    pub fn new(to: impl Into<String>, via: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            via: via.into(),
            metric: None,
        }
    }

    /// Sets the route metric.
    #[must_use]
    pub const fn with_metric(mut self, metric: u32) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Parses a compact route token.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteParseError`] if the destination or gateway is
    /// missing, the metric is not a number, or extra segments follow.
    pub fn parse(token: &str) -> Result<Self, RouteParseError> {
        let segments: Vec<&str> = token.trim().split(SEPARATORS).collect();

        let (to, via, metric) = match segments.as_slice() {
            [to, via] => (*to, *via, None),
            [to, via, metric] => (*to, *via, Some(*metric)),
            [_] => return Err(RouteParseError::MissingGateway(token.to_string())),
            _ => return Err(RouteParseError::TrailingSegments(token.to_string())),
        };

        if to.is_empty() {
            return Err(RouteParseError::MissingDestination(token.to_string()));
        }
        if via.is_empty() {
            return Err(RouteParseError::MissingGateway(token.to_string()));
        }

        let route = Self::new(to, via);
        match metric.filter(|m| !m.is_empty()) {
            None => Ok(route),
            Some(text) => text
                .parse()
                .map(|value| route.with_metric(value))
                .map_err(|_| RouteParseError::InvalidMetric {
                    token: token.to_string(),
                    metric: text.to_string(),
                }),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.to, self.via)?;
        if let Some(metric) = self.metric {
            write!(f, " metric {metric}")?;
        }
        Ok(())
    }
}

/// Errors raised while parsing a route token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteParseError {
    /// The token has no destination before the first separator.
    #[error("Invalid route '{0}': missing destination")]
    MissingDestination(String),

    /// The token has no gateway segment.
    #[error("Invalid route '{0}': missing gateway (expected <to>=<via>[m<metric>])")]
    MissingGateway(String),

    /// The metric segment is not an unsigned integer.
    #[error("Invalid route '{token}': metric '{metric}' is not a number")]
    InvalidMetric {
        /// The full route token.
        token: String,
        /// The offending metric text.
        metric: String,
    },

    /// More than three segments were found.
    #[error("Invalid route '{0}': unexpected segments after metric")]
    TrailingSegments(String),
}

/// Metric as written by older tools: either an integer or a quoted number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetric {
    Number(u32),
    Text(String),
}

fn deserialize_metric<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawMetric>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawMetric::Number(value)) => Ok(Some(value)),
        Some(RawMetric::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawMetric::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("metric '{text}' is not a number"))),
    }
}
