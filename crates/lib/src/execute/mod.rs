//! Descriptor execution.
//!
//! Runs a validated [`HelmCmd`] through its phases, strictly in order:
//!
//! 1. Pre-commands, in registration order
//! 2. The main `helm` invocation
//! 3. `helm test --logs <release>` when testing is enabled, followed by
//!    `helm rollback <release>` if the test fails and test rollback is enabled
//! 4. Post-commands, in registration order
//!
//! The first failure ends the run. Post-commands never run after a failed test,
//! whatever the outcome of the rollback.

pub mod types;

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::command::{HELM, HelmCmd, rollback_args, test_args};
use crate::runner::{RunContext, Runner, RunnerError};

pub use types::RunError;

impl HelmCmd {
  /// Execute the descriptor, consuming it.
  ///
  /// The same `ctx` is passed to every runner call; the runner decides how to
  /// honor cancellation and deadlines.
  ///
  /// # Errors
  ///
  /// Returns the error of the first failing phase. When the test fails and the
  /// rollback succeeds, the original test error is returned.
  pub async fn run(self, ctx: &RunContext) -> Result<(), RunError> {
    let runner = self.runner.clone().ok_or(RunError::NoRunner)?;
    info!(release = %self.release, "running release");

    for pre_cmd in &self.pre_cmds {
      debug!(command = ?pre_cmd, "running pre-command");
      run_argv(runner.as_ref(), ctx, pre_cmd).await.map_err(RunError::PreCmd)?;
    }

    debug!(args = ?self.args, "running helm");
    runner.run(ctx, HELM, &self.args).await.map_err(RunError::Helm)?;

    if self.test {
      self.run_test(&runner, ctx).await?;
    }

    for post_cmd in &self.post_cmds {
      debug!(command = ?post_cmd, "running post-command");
      run_argv(runner.as_ref(), ctx, post_cmd).await.map_err(RunError::PostCmd)?;
    }

    info!(release = %self.release, "release complete");
    Ok(())
  }

  async fn run_test(&self, runner: &Arc<dyn Runner>, ctx: &RunContext) -> Result<(), RunError> {
    debug!(release = %self.release, "running helm test");

    let test_err = match runner.run(ctx, HELM, &test_args(&self.release)).await {
      Ok(()) => return Ok(()),
      Err(e) => e,
    };

    error!(release = %self.release, error = %test_err, "test failed");

    if self.test_rollback {
      if let Err(rollback_err) = runner.run(ctx, HELM, &rollback_args(&self.release)).await {
        error!(
          release = %self.release,
          error = %rollback_err,
          test_error = %test_err,
          "rollback failed"
        );
        return Err(RunError::Rollback(rollback_err));
      }
      info!(release = %self.release, test_error = %test_err, "test failed, release rolled back");
    }

    Err(RunError::Test(test_err))
  }
}

/// Run a stored argument vector (executable first).
async fn run_argv(runner: &dyn Runner, ctx: &RunContext, argv: &[String]) -> Result<(), RunnerError> {
  let (program, args) = argv.split_first().map(|(p, a)| (p.as_str(), a)).unwrap_or_default();
  runner.run(ctx, program, args).await
}
