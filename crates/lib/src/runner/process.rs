//! Process-backed runner.
//!
//! Spawns each command directly (no shell) with `tokio::process`, inheriting stdio
//! so `helm` output streams straight to the caller's terminal.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{RunContext, Runner, RunnerError};

/// Runs commands as child processes.
///
/// The child is killed when the [`RunContext`] ends before it exits. `kill_on_drop`
/// covers the case where the whole future is dropped instead.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
  env: BTreeMap<String, String>,
  current_dir: Option<PathBuf>,
}

impl ProcessRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set an extra environment variable for every spawned command.
  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  /// Run every command from `dir` instead of the current directory.
  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.current_dir = Some(dir.into());
    self
  }
}

#[async_trait]
impl Runner for ProcessRunner {
  async fn run(&self, ctx: &RunContext, program: &str, args: &[String]) -> Result<(), RunnerError> {
    if let Some(done) = ctx.state() {
      debug!(program = %program, reason = %done, "context already done, not starting command");
      return Err(RunnerError::interrupted(program, done));
    }

    info!(program = %program, args = ?args, "running command");

    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);

    if let Some(dir) = &self.current_dir {
      command.current_dir(dir);
    }
    for (key, value) in &self.env {
      command.env(key, value);
    }

    let mut child = command.spawn().map_err(|error| RunnerError::Spawn {
      program: program.to_string(),
      error,
    })?;

    tokio::select! {
      status = child.wait() => {
        let status = status.map_err(|error| RunnerError::Wait {
          program: program.to_string(),
          error,
        })?;

        if status.success() {
          debug!(program = %program, "command succeeded");
          Ok(())
        } else {
          debug!(program = %program, code = ?status.code(), "command failed");
          Err(RunnerError::Exit {
            program: program.to_string(),
            code: status.code(),
          })
        }
      }
      done = ctx.done() => {
        warn!(program = %program, reason = %done, "stopping command");
        if let Err(e) = child.kill().await {
          warn!(program = %program, error = %e, "failed to kill command");
        }
        Err(RunnerError::interrupted(program, done))
      }
    }
  }
}
