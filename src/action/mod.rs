//! Dispatch of a single configuration action.
//!
//! | Action        | Loads | Resets entry | Saves | Reconciles | Result                 |
//! |---------------|-------|--------------|-------|------------|------------------------|
//! | `get_dhcp`    | yes   | no           | no    | no         | 0 / 1 / 2              |
//! | `restart`     | no    | no           | no    | yes        | reconciliation status  |
//! | `set_dhcp`    | yes   | yes          | yes   | yes        | reconciliation status  |
//! | `set_gateway` | yes   | no           | yes   | yes        | reconciliation status  |
//! | `set_ip`      | yes   | yes          | yes   | yes        | reconciliation status  |
//! | `set_route`   | yes   | no           | yes   | yes        | reconciliation status  |
//!
//! Mutating actions always save and reconcile, even when the mutation
//! changed nothing (a duplicate route, say).

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt;

use thiserror::Error;

use crate::document::{DhcpState, DocumentError, NetplanDocument, RouteUpdate};
use crate::network::{AddressError, IpFamily, RouteParseError};
use crate::reconcile::{ReconcileError, ReconcileReport, Reconciler, reconcile};
use crate::store::{DocumentStore, LoadError, SaveError};

/// One requested change or query for an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Report whether DHCP is enabled for a family.
    GetDhcp {
        /// Family to query.
        family: IpFamily,
    },
    /// Re-apply the configuration on disk.
    Restart,
    /// Reset the entry and enable DHCP for each `4`/`6` in `protocols`.
    SetDhcp {
        /// Protocol digits, e.g. `"46"`.
        protocols: String,
    },
    /// Set default gateways.
    SetGateway {
        /// Gateway addresses.
        addresses: Vec<String>,
    },
    /// Reset the entry to static addresses.
    SetIp {
        /// Addresses, bare or with a prefix length or netmask.
        addresses: Vec<String>,
        /// Option tokens (`dhcp`, `dhcp6`).
        options: Vec<String>,
    },
    /// Add a route, or remove routes with `remove`/`remove6`.
    SetRoute {
        /// Route token.
        token: String,
    },
}

impl Action {
    /// Command-line name of the action.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetDhcp { .. } => "get_dhcp",
            Self::Restart => "restart",
            Self::SetDhcp { .. } => "set_dhcp",
            Self::SetGateway { .. } => "set_gateway",
            Self::SetIp { .. } => "set_ip",
            Self::SetRoute { .. } => "set_route",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Successful result of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Answer of `get_dhcp`.
    Dhcp(DhcpState),
    /// Reconciliation ran and succeeded.
    Reconciled(ReconcileReport),
    /// Dry run of a mutating action: the document that would be saved.
    DryRun(String),
    /// Dry run of `restart`: nothing was done.
    Skipped,
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Dhcp(state) => state.exit_code(),
            Self::Reconciled(report) => report.exit_code(),
            Self::DryRun(_) | Self::Skipped => 0,
        }
    }
}

/// Errors raised while performing an action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The existing document could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The updated document could not be saved.
    #[error(transparent)]
    Save(#[from] SaveError),

    /// The route token is malformed.
    #[error(transparent)]
    Route(#[from] RouteParseError),

    /// An address could not be normalised.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// The document could not be rendered for a dry run.
    #[error(transparent)]
    Render(#[from] DocumentError),

    /// Reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl ActionError {
    /// Exit code of a failed reconciliation phase, if that is the cause.
    #[must_use]
    pub fn exit_code(&self) -> Option<u8> {
        match self {
            Self::Reconcile(e) => e.exit_code(),
            _ => None,
        }
    }
}

/// Performs actions against a document store and a reconciler.
///
/// # Type Parameters
///
/// - `S`: where documents are loaded from and saved to
/// - `R`: what applies saved documents to the system
#[derive(Debug)]
pub struct ActionEngine<S, R> {
    store: S,
    reconciler: R,
    dry_run: bool,
}

impl<S: DocumentStore, R: Reconciler> ActionEngine<S, R> {
    /// Creates an engine.
    #[must_use]
    pub const fn new(store: S, reconciler: R) -> Self {
        Self {
            store,
            reconciler,
            dry_run: false,
        }
    }

    /// In dry-run mode, mutations are rendered but neither saved nor applied.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the document store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &R {
        &self.reconciler
    }

    /// Performs `action` on `interface`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if loading, mutating, saving or reconciling
    /// fails. Nothing is retried.
    pub async fn perform(&self, interface: &str, action: &Action) -> Result<Outcome, ActionError> {
        tracing::info!("{action} on {interface}");

        match action {
            Action::GetDhcp { family } => {
                let state = self.store.load(interface)?.dhcp_state(*family);
                tracing::info!("{} on {interface} is {state}", family.dhcp_key());
                Ok(Outcome::Dhcp(state))
            }
            Action::Restart => {
                if self.dry_run {
                    tracing::info!("Dry run: not running netplan");
                    return Ok(Outcome::Skipped);
                }
                self.reconcile().await
            }
            Action::SetDhcp { protocols } => {
                self.mutate(interface, |doc| {
                    doc.set_dhcp(protocols);
                    Ok(())
                })
                .await
            }
            Action::SetGateway { addresses } => {
                self.mutate(interface, |doc| {
                    doc.set_gateway(addresses.iter().map(String::as_str));
                    Ok(())
                })
                .await
            }
            Action::SetIp { addresses, options } => {
                self.mutate(interface, |doc| {
                    doc.set_ip(
                        addresses.iter().map(String::as_str),
                        options.iter().map(String::as_str),
                    )?;
                    Ok(())
                })
                .await
            }
            Action::SetRoute { token } => {
                self.mutate(interface, |doc| {
                    log_route_update(&doc.set_route(token)?);
                    Ok(())
                })
                .await
            }
        }
    }

    /// Loads, mutates, saves and reconciles.
    async fn mutate<F>(&self, interface: &str, mutation: F) -> Result<Outcome, ActionError>
    where
        F: FnOnce(&mut NetplanDocument) -> Result<(), ActionError>,
    {
        let mut document = self.store.load(interface)?;
        mutation(&mut document)?;

        if self.dry_run {
            tracing::info!("Dry run: not saving or applying");
            return Ok(Outcome::DryRun(document.to_yaml()?));
        }

        self.store.save(&document).await?;
        self.reconcile().await
    }

    async fn reconcile(&self) -> Result<Outcome, ActionError> {
        Ok(Outcome::Reconciled(reconcile(&self.reconciler).await?))
    }
}

fn log_route_update(update: &RouteUpdate) {
    match update {
        RouteUpdate::Added(route) => tracing::info!("Added route {route}"),
        RouteUpdate::AlreadyPresent(route) => tracing::info!("Route {route} already present"),
        RouteUpdate::Removed { family, count } => {
            tracing::info!("Removed {count} {family} route(s)");
        }
    }
}
