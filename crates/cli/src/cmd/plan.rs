//! Implementation of the `helmrun plan` command.
//!
//! Builds and validates the descriptor exactly as `upgrade`/`rollback` would,
//! then prints the commands a successful run issues instead of running them.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use helmrun_lib::{DeployConfig, HelmCmd, Invocation, Mode, ProcessRunner};

use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PlanMode {
  #[default]
  Upgrade,
  Rollback,
}

impl From<PlanMode> for Mode {
  fn from(mode: PlanMode) -> Self {
    match mode {
      PlanMode::Upgrade => Mode::InstallUpgrade,
      PlanMode::Rollback => Mode::Rollback,
    }
  }
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
  release: &'a str,
  chart: &'a str,
  rollback_on_test_failure: bool,
  invocations: Vec<Invocation>,
}

pub fn cmd_plan(config: DeployConfig, mode: PlanMode, output: OutputFormat) -> Result<()> {
  // The runner is never called; the descriptor only needs one to validate.
  let options = config
    .options(Arc::new(ProcessRunner::new()))
    .context("Invalid deploy config")?;
  let cmd = HelmCmd::new(mode.into(), options).context("Failed to build helm command")?;

  let rollback_on_test_failure = cmd.test() && cmd.test_rollback();
  let invocations = cmd.invocations();

  if output.is_json() {
    return print_json(&PlanOutput {
      release: cmd.release(),
      chart: cmd.chart(),
      rollback_on_test_failure,
      invocations,
    });
  }

  for invocation in &invocations {
    let phase = format!("{:<4}", invocation.phase.as_str());
    println!(
      "{} {} {}",
      phase.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      symbols::ARROW,
      invocation.command_line()
    );
  }

  if rollback_on_test_failure {
    print_info(&format!("On test failure: helm rollback {}", cmd.release()));
  }
  print_info(&format!("{} command(s) planned", invocations.len()));

  Ok(())
}
