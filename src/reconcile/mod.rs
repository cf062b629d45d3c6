//! Applying saved documents to the running system.
//!
//! Reconciliation is two external steps run strictly in order:
//! `generate` renders backend configuration from the documents on disk,
//! `apply` activates it. Apply is never attempted after a failed
//! generate, and neither step is retried: a half-applied configuration
//! is reported, not papered over.

mod netplan;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use netplan::NetplanCommand;

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// One step of reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Render backend configuration.
    Generate,
    /// Activate the rendered configuration.
    Apply,
}

impl Phase {
    /// Subcommand passed to the reconciliation tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Apply => "apply",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one finished phase with its captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutput {
    /// The phase that ran.
    pub phase: Phase,
    /// Exit status; `None` if the process was killed by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl PhaseOutput {
    /// Creates an output record.
    #[must_use]
    pub fn new(
        phase: Phase,
        status: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the phase exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }

    /// Exit code to report for this phase.
    ///
    /// Termination by signal, and statuses outside `0..=255`, map to 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.status.map_or(1, |code| u8::try_from(code).unwrap_or(1))
    }

    /// Logs captured output: at info level after success, at error level
    /// after a failure.
    pub fn log_output(&self) {
        for (stream, text) in [("stdout", &self.stdout), ("stderr", &self.stderr)] {
            let text = text.trim_end();
            if text.trim().is_empty() {
                continue;
            }
            if self.success() {
                tracing::info!("{} {stream}: {text}", self.phase);
            } else {
                tracing::error!("{} {stream}: {text}", self.phase);
            }
        }
    }
}

impl fmt::Display for PhaseOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} exited with status {code}", self.phase)?,
            None => write!(f, "{} was terminated by a signal", self.phase)?,
        }
        write!(
            f,
            "\nstdout: {}\nstderr: {}",
            self.stdout.trim_end(),
            self.stderr.trim_end()
        )
    }
}

/// Both phases of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The generate phase.
    pub generate: PhaseOutput,
    /// The apply phase.
    pub apply: PhaseOutput,
}

impl ReconcileReport {
    /// Exit code of the run: the apply phase's.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.apply.exit_code()
    }
}

/// Errors raised by reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Generate exited non-zero; apply was not attempted.
    #[error("netplan generate failed: {0}")]
    GenerateFailed(PhaseOutput),

    /// Apply exited non-zero after a successful generate.
    #[error("netplan apply failed: {apply}\nafter {generate}")]
    ApplyFailed {
        /// The successful generate phase.
        generate: PhaseOutput,
        /// The failed apply phase.
        apply: PhaseOutput,
    },

    /// The tool could not be started.
    #[error("Failed to run '{} {phase}': {source}", program.display())]
    Spawn {
        /// Phase being started.
        phase: Phase,
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ReconcileError {
    /// Exit code of the failed phase, or `None` if no phase ran to completion.
    #[must_use]
    pub fn exit_code(&self) -> Option<u8> {
        match self {
            Self::GenerateFailed(output) | Self::ApplyFailed { apply: output, .. } => {
                Some(output.exit_code())
            }
            Self::Spawn { .. } => None,
        }
    }
}

/// Runs a single reconciliation phase.
///
/// # Testing
///
/// Use [`mock::MockReconciler`] to script phase results without spawning
/// processes.
pub trait Reconciler: Send + Sync {
    /// Runs `phase` to completion and captures its output.
    ///
    /// A non-zero exit is not an error at this level; it is returned as
    /// a [`PhaseOutput`] for [`reconcile`] to interpret.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Spawn`] if the phase could not be started.
    fn run_phase(
        &self,
        phase: Phase,
    ) -> impl std::future::Future<Output = Result<PhaseOutput, ReconcileError>> + Send;
}

/// Runs generate then apply, stopping at the first failure.
///
/// # Errors
///
/// Returns [`ReconcileError::GenerateFailed`] or [`ReconcileError::ApplyFailed`]
/// carrying the captured output of the failing phase, or
/// [`ReconcileError::Spawn`] if a phase could not be started.
pub async fn reconcile<R: Reconciler>(reconciler: &R) -> Result<ReconcileReport, ReconcileError> {
    let generate = reconciler.run_phase(Phase::Generate).await?;
    generate.log_output();
    if !generate.success() {
        return Err(ReconcileError::GenerateFailed(generate));
    }

    let apply = reconciler.run_phase(Phase::Apply).await?;
    apply.log_output();
    if !apply.success() {
        return Err(ReconcileError::ApplyFailed { generate, apply });
    }

    tracing::info!("Configuration applied");
    Ok(ReconcileReport { generate, apply })
}
