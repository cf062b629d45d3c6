//! Application execution logic.
//!
//! Wires the file-backed document store and the netplan command into an
//! action engine, runs the requested action once, and turns its result
//! into an exit status.

use netplan_cfg::action::{ActionEngine, ActionError, Outcome};
use netplan_cfg::config::ValidatedConfig;
use netplan_cfg::reconcile::NetplanCommand;
use netplan_cfg::store::FileDocumentStore;

use crate::app::exit_code;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Executes the configured action.
///
/// # Errors
///
/// Returns the action's error unchanged; see [`finish`] for how it maps to
/// an exit status.
pub async fn execute(config: ValidatedConfig) -> Result<Outcome, ActionError> {
    let store = FileDocumentStore::new(config.config_dir, config.file_prefix);
    let reconciler = NetplanCommand::new(config.netplan_command);
    let engine = ActionEngine::new(store, reconciler).with_dry_run(config.dry_run);

    engine.perform(&config.interface, &config.action).await
}

/// Reports the result of an action and returns the process exit status.
///
/// A dry run prints the rendered document to stdout. Errors are logged,
/// netplan failures exit with netplan's own status and everything else with
/// [`exit_code::RUNTIME_ERROR`].
pub fn finish(result: Result<Outcome, ActionError>) -> u8 {
    match result {
        Ok(Outcome::DryRun(yaml)) => {
            print!("{yaml}");
            0
        }
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            tracing::error!("{e}");
            exit_status(&e)
        }
    }
}

/// Maps an action error to the process exit status.
fn exit_status(error: &ActionError) -> u8 {
    error.exit_code().unwrap_or(exit_code::RUNTIME_ERROR)
}
