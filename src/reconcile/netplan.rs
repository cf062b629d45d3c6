//! Reconciliation through the `netplan` command line tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::{Phase, PhaseOutput, ReconcileError, Reconciler};

/// Runs `<program> generate` and `<program> apply`.
///
/// Each phase waits for the process to exit; there is no timeout.
#[derive(Debug, Clone)]
pub struct NetplanCommand {
    program: PathBuf,
}

impl NetplanCommand {
    /// Creates a reconciler invoking `program` (usually `netplan`).
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the program being invoked.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Reconciler for NetplanCommand {
    async fn run_phase(&self, phase: Phase) -> Result<PhaseOutput, ReconcileError> {
        tracing::debug!("Running {} {phase}", self.program.display());

        let output = Command::new(&self.program)
            .arg(phase.as_str())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ReconcileError::Spawn {
                phase,
                program: self.program.clone(),
                source,
            })?;

        Ok(PhaseOutput::new(
            phase,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ))
    }
}
