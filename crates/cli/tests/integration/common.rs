//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Logs its arguments to `$HELM_LOG`, hangs for `$HELM_SLEEP` seconds when set,
/// and exits with `$HELM_TEST_EXIT` for `helm test` and `$HELM_EXIT` for
/// everything else.
#[cfg(unix)]
const FAKE_HELM: &str = r#"#!/bin/sh
echo "helm $*" >> "$HELM_LOG"
if [ -n "$HELM_SLEEP" ]; then
  exec sleep "$HELM_SLEEP"
fi
if [ "$1" = "test" ]; then
  exit "${HELM_TEST_EXIT:-0}"
fi
exit "${HELM_EXIT:-0}"
"#;

/// Appends its arguments to `$HELM_LOG`, for pre/post commands.
#[cfg(unix)]
const NOTE: &str = r#"#!/bin/sh
echo "$*" >> "$HELM_LOG"
"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the deploy file, a fake
/// `helm` on `PATH` and the log that fake writes to.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    Self { temp }
  }

  /// Write a file relative to the temp directory and return its path.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Install the fake `helm` and a `note` command into `bin/`.
  #[cfg(unix)]
  pub fn with_fake_helm(self) -> Self {
    use std::os::unix::fs::PermissionsExt;

    for (name, script) in [("helm", FAKE_HELM), ("note", NOTE)] {
      let path = self.write_file(&format!("bin/{}", name), script);
      std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    self
  }

  pub fn log_path(&self) -> PathBuf {
    self.temp.path().join("helm.log")
  }

  /// Lines the fake `helm` and any logging pre/post commands wrote.
  pub fn log(&self) -> Vec<String> {
    std::fs::read_to_string(self.log_path())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Get a pre-configured Command for the helmrun binary.
  ///
  /// Runs from the temp directory with `bin/` prepended to `PATH` and
  /// `HELM_LOG` pointing at the log file.
  pub fn helmrun_cmd(&self) -> Command {
    let path = std::env::var("PATH").unwrap_or_default();
    let mut cmd: Command = cargo_bin_cmd!("helmrun");
    cmd.current_dir(self.temp.path());
    cmd.env("PATH", format!("{}:{}", self.temp.path().join("bin").display(), path));
    cmd.env("HELM_LOG", self.log_path());
    cmd.env_remove("HELMRUN_CONFIG");
    cmd
  }
}
