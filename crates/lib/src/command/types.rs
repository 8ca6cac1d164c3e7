//! Types for command construction.
//!
//! Error types for option application and descriptor validation, and the
//! [`Invocation`] view of the commands a descriptor will issue.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors returned by a single option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
  /// A repo, `--set` or `--set-string` entry without `=`.
  #[error("not in key=value format: {0}")]
  NotKeyValue(String),

  /// A pre/post command with no executable.
  #[error("command must not be empty")]
  EmptyCommand,
}

/// Errors that abort [`HelmCmd::new`](super::HelmCmd::new).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// An option failed; nothing built so far is kept.
  #[error("unable to parse option: {0}")]
  Option(#[from] OptionError),

  #[error("release name is required")]
  MissingRelease,

  /// Install/upgrade mode needs a chart; rollback does not.
  #[error("chart path is required")]
  MissingChart,

  #[error("runner is required")]
  MissingRunner,
}

/// Step of the execution sequence a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Pre,
  Main,
  Test,
  Rollback,
  Post,
}

impl Phase {
  pub fn as_str(self) -> &'static str {
    match self {
      Phase::Pre => "pre",
      Phase::Main => "main",
      Phase::Test => "test",
      Phase::Rollback => "rollback",
      Phase::Post => "post",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One command line the engine issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub phase: Phase,
  pub program: String,
  pub args: Vec<String>,
}

impl Invocation {
  pub(crate) fn new(phase: Phase, program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      phase,
      program: program.into(),
      args,
    }
  }

  /// Split a stored argument vector into program and args.
  pub(crate) fn from_argv(phase: Phase, argv: &[String]) -> Self {
    match argv.split_first() {
      Some((program, args)) => Self::new(phase, program.clone(), args.to_vec()),
      None => Self::new(phase, String::new(), Vec::new()),
    }
  }

  /// Program and args joined with spaces, for display only.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.phase, self.command_line())
  }
}
