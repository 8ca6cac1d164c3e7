//! Types for descriptor execution.

use thiserror::Error;

use crate::command::Phase;
use crate::runner::RunnerError;

/// Errors that end a run.
///
/// Each variant names the phase that failed and carries the runner's reason.
/// `Test` is returned both when no rollback was configured and when the
/// rollback that followed the failed test succeeded.
#[derive(Debug, Error)]
pub enum RunError {
  /// A pre-command failed; the main command never ran.
  #[error("precmd failed: {0}")]
  PreCmd(RunnerError),

  /// The main `helm` invocation failed.
  #[error("helm failed: {0}")]
  Helm(RunnerError),

  /// `helm test` failed.
  #[error(transparent)]
  Test(RunnerError),

  /// The rollback after a failed test also failed.
  #[error(transparent)]
  Rollback(RunnerError),

  /// A post-command failed.
  #[error("postcmd failed: {0}")]
  PostCmd(RunnerError),

  /// The descriptor carries no runner.
  ///
  /// [`HelmCmd::new`](crate::command::HelmCmd::new) rejects descriptors without
  /// a runner, so only a descriptor assembled inside this crate without going
  /// through it can report this.
  #[error("runner is required")]
  NoRunner,
}

impl RunError {
  /// Phase whose command failed.
  pub fn phase(&self) -> Option<Phase> {
    match self {
      RunError::PreCmd(_) => Some(Phase::Pre),
      RunError::Helm(_) => Some(Phase::Main),
      RunError::Test(_) => Some(Phase::Test),
      RunError::Rollback(_) => Some(Phase::Rollback),
      RunError::PostCmd(_) => Some(Phase::Post),
      RunError::NoRunner => None,
    }
  }

  /// The runner failure behind this error.
  pub fn runner_error(&self) -> Option<&RunnerError> {
    match self {
      RunError::PreCmd(e) | RunError::Helm(e) | RunError::Test(e) | RunError::Rollback(e) | RunError::PostCmd(e) => {
        Some(e)
      }
      RunError::NoRunner => None,
    }
  }
}
