//! Command descriptor construction.
//!
//! A [`HelmCmd`] is assembled in one call to [`HelmCmd::new`]:
//!
//! 1. The [`Mode`] writes its keyword(s) at the front of the argument list
//! 2. Each [`HelmOption`] is applied in the order given; the first error aborts
//! 3. The descriptor is validated and the positional `release` (and `chart` in
//!    install/upgrade mode) are appended to the argument list
//!
//! The result is handed to [`HelmCmd::run`](crate::execute) exactly once.

pub mod options;
pub mod types;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::runner::Runner;

pub use options::*;
pub use types::{BuildError, Invocation, OptionError, Phase};

/// Executable every generated command line is addressed to.
pub const HELM: &str = "helm";

/// Token whose presence in the argument list marks install/upgrade mode.
const UPGRADE_MARKER: &str = "upgrade";

/// Top-level action of the main invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// `helm upgrade --install`
  InstallUpgrade,
  /// `helm rollback`
  Rollback,
}

impl Mode {
  pub fn keywords(self) -> &'static [&'static str] {
    match self {
      Mode::InstallUpgrade => &[UPGRADE_MARKER, "--install"],
      Mode::Rollback => &["rollback"],
    }
  }

  fn apply(self, cmd: &mut HelmCmd) {
    let mut args: Vec<String> = self.keywords().iter().map(|k| k.to_string()).collect();
    args.append(&mut cmd.args);
    cmd.args = args;
  }
}

/// Everything needed to run one release: the main `helm` argument list, the
/// commands around it and the runner that executes them.
pub struct HelmCmd {
  pub(crate) release: String,
  pub(crate) chart: String,
  pub(crate) args: Vec<String>,
  pub(crate) pre_cmds: Vec<Vec<String>>,
  pub(crate) post_cmds: Vec<Vec<String>>,
  pub(crate) runner: Option<Arc<dyn Runner>>,
  pub(crate) test: bool,
  pub(crate) test_rollback: bool,
}

impl HelmCmd {
  /// Build and validate a descriptor from a mode and an ordered list of options.
  pub fn new(mode: Mode, options: impl IntoIterator<Item = HelmOption>) -> Result<Self, BuildError> {
    let mut cmd = HelmCmd {
      release: String::new(),
      chart: String::new(),
      args: Vec::new(),
      pre_cmds: Vec::new(),
      post_cmds: Vec::new(),
      runner: None,
      test: false,
      test_rollback: false,
    };

    mode.apply(&mut cmd);
    options.into_iter().try_for_each(|option| option(&mut cmd))?;
    cmd.finalize()?;

    debug!(
      release = %cmd.release,
      args = ?cmd.args,
      pre_cmds = cmd.pre_cmds.len(),
      post_cmds = cmd.post_cmds.len(),
      "built helm command"
    );

    Ok(cmd)
  }

  fn finalize(&mut self) -> Result<(), BuildError> {
    let upgrade_mode = self.is_upgrade_mode();

    if self.release.is_empty() {
      return Err(BuildError::MissingRelease);
    }
    if upgrade_mode && self.chart.is_empty() {
      return Err(BuildError::MissingChart);
    }
    if self.runner.is_none() {
      return Err(BuildError::MissingRunner);
    }

    self.args.push(self.release.clone());
    if upgrade_mode {
      self.args.push(self.chart.clone());
    }
    Ok(())
  }

  fn is_upgrade_mode(&self) -> bool {
    self.args.iter().any(|arg| arg == UPGRADE_MARKER)
  }

  pub fn release(&self) -> &str {
    &self.release
  }

  pub fn chart(&self) -> &str {
    &self.chart
  }

  /// Arguments of the main `helm` invocation.
  pub fn args(&self) -> &[String] {
    &self.args
  }

  pub fn pre_cmds(&self) -> &[Vec<String>] {
    &self.pre_cmds
  }

  pub fn post_cmds(&self) -> &[Vec<String>] {
    &self.post_cmds
  }

  pub fn test(&self) -> bool {
    self.test
  }

  pub fn test_rollback(&self) -> bool {
    self.test_rollback
  }

  /// The commands a fully successful run issues, in order.
  ///
  /// The rollback after a failed test is not listed since it only runs on failure.
  pub fn invocations(&self) -> Vec<Invocation> {
    let mut invocations: Vec<Invocation> = self
      .pre_cmds
      .iter()
      .map(|argv| Invocation::from_argv(Phase::Pre, argv))
      .collect();

    invocations.push(Invocation::new(Phase::Main, HELM, self.args.clone()));

    if self.test {
      invocations.push(Invocation::new(Phase::Test, HELM, test_args(&self.release)));
    }

    invocations.extend(self.post_cmds.iter().map(|argv| Invocation::from_argv(Phase::Post, argv)));
    invocations
  }
}

impl fmt::Debug for HelmCmd {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HelmCmd")
      .field("release", &self.release)
      .field("chart", &self.chart)
      .field("args", &self.args)
      .field("pre_cmds", &self.pre_cmds)
      .field("post_cmds", &self.post_cmds)
      .field("runner", &self.runner.as_ref().map(|_| "<runner>"))
      .field("test", &self.test)
      .field("test_rollback", &self.test_rollback)
      .finish()
  }
}

/// `helm test --logs <release>`
pub(crate) fn test_args(release: &str) -> Vec<String> {
  vec!["test".to_string(), "--logs".to_string(), release.to_string()]
}

/// `helm rollback <release>`, without any of the main invocation's flags.
pub(crate) fn rollback_args(release: &str) -> Vec<String> {
  vec!["rollback".to_string(), release.to_string()]
}
