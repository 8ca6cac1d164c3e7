//! Implementation of the `helmrun upgrade` and `helmrun rollback` commands.
//!
//! Both build a descriptor from the resolved deploy config and run it with a
//! [`ProcessRunner`]. Ctrl-C cancels the run; the child process that is running
//! at that moment is killed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::warn;

use helmrun_lib::{DeployConfig, HelmCmd, Mode, ProcessRunner, RunContext, RunError};

use crate::output::{format_duration, print_error, print_success, print_warning};

pub fn cmd_upgrade(config: DeployConfig, deadline: Option<Duration>) -> Result<()> {
  run_release(Mode::InstallUpgrade, config, deadline)
}

pub fn cmd_rollback(config: DeployConfig, deadline: Option<Duration>) -> Result<()> {
  run_release(Mode::Rollback, config, deadline)
}

fn run_release(mode: Mode, config: DeployConfig, deadline: Option<Duration>) -> Result<()> {
  let options = config
    .options(Arc::new(ProcessRunner::new()))
    .context("Invalid deploy config")?;
  let cmd = HelmCmd::new(mode, options).context("Failed to build helm command")?;

  let release = cmd.release().to_string();
  let rolls_back_on_test_failure = cmd.test() && cmd.test_rollback();
  let action = match mode {
    Mode::InstallUpgrade => "Upgrade",
    Mode::Rollback => "Rollback",
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let start = Instant::now();

  let result = rt.block_on(async {
    let (mut ctx, cancel) = RunContext::with_cancel();
    if let Some(deadline) = deadline {
      ctx = ctx.with_timeout(deadline);
    }

    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, cancelling run");
        cancel.cancel();
      }
    });

    cmd.run(&ctx).await
  });

  match result {
    Ok(()) => {
      print_success(&format!(
        "{} of release '{}' complete in {}",
        action,
        release,
        format_duration(start.elapsed())
      ));
      Ok(())
    }
    Err(err) => {
      if matches!(err, RunError::Test(_)) && rolls_back_on_test_failure {
        print_warning(&format!("Tests failed, release '{}' was rolled back", release));
      }
      if let Some(phase) = err.phase() {
        print_error(&format!("{} of release '{}' failed in the {} phase", action, release, phase));
      }
      Err(anyhow::Error::new(err).context(format!("{} of release '{}' failed", action, release)))
    }
  }
}
