//! Composable options for [`HelmCmd`].
//!
//! Every option is an independent closure over the descriptor. Options only ever
//! append: applying one twice appends its flag or command twice.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::types::OptionError;
use super::{HELM, HelmCmd};
use crate::runner::Runner;
use crate::util::duration::format_go_duration;

/// A single configuration step applied to a descriptor under construction.
pub type HelmOption = Box<dyn FnOnce(&mut HelmCmd) -> Result<(), OptionError> + Send>;

fn option(f: impl FnOnce(&mut HelmCmd) -> Result<(), OptionError> + Send + 'static) -> HelmOption {
  Box::new(f)
}

/// Append `flag` to the main arguments when `enabled`.
fn flag(enabled: bool, flag: &'static str) -> HelmOption {
  option(move |cmd| {
    if enabled {
      cmd.args.push(flag.to_string());
    }
    Ok(())
  })
}

fn owned(items: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
  items.into_iter().map(Into::into).collect()
}

/// Split on the first `=` only.
fn split_key_value(entry: &str) -> Result<(&str, &str), OptionError> {
  entry
    .split_once('=')
    .ok_or_else(|| OptionError::NotKeyValue(entry.to_string()))
}

fn helm_cmd(args: &[&str]) -> Vec<String> {
  std::iter::once(HELM).chain(args.iter().copied()).map(String::from).collect()
}

pub fn with_release(release: impl Into<String>) -> HelmOption {
  let release = release.into();
  option(move |cmd| {
    cmd.release = release;
    Ok(())
  })
}

pub fn with_chart(chart: impl Into<String>) -> HelmOption {
  let chart = chart.into();
  option(move |cmd| {
    cmd.chart = chart;
    Ok(())
  })
}

pub fn with_runner(runner: Arc<dyn Runner>) -> HelmOption {
  option(move |cmd| {
    cmd.runner = Some(runner);
    Ok(())
  })
}

/// `-n <namespace>`
pub fn with_namespace(namespace: impl Into<String>) -> HelmOption {
  let namespace = namespace.into();
  option(move |cmd| {
    cmd.args.push("-n".to_string());
    cmd.args.push(namespace);
    Ok(())
  })
}

/// Pre-command `helm lint <chart>`, using the chart set by earlier options.
pub fn with_lint(lint: bool) -> HelmOption {
  option(move |cmd| {
    if lint {
      let lint_cmd = helm_cmd(&["lint", cmd.chart.as_str()]);
      cmd.pre_cmds.push(lint_cmd);
    }
    Ok(())
  })
}

pub fn with_atomic(atomic: bool) -> HelmOption {
  flag(atomic, "--atomic")
}

pub fn with_wait(wait: bool) -> HelmOption {
  flag(wait, "--wait")
}

pub fn with_force(force: bool) -> HelmOption {
  flag(force, "--force")
}

pub fn with_cleanup_on_fail(cleanup: bool) -> HelmOption {
  flag(cleanup, "--cleanup-on-fail")
}

pub fn with_dry_run(dry_run: bool) -> HelmOption {
  flag(dry_run, "--dry-run")
}

/// `--timeout <duration>` in the Go duration syntax `helm` parses.
pub fn with_timeout(timeout: Duration) -> HelmOption {
  option(move |cmd| {
    cmd.args.push("--timeout".to_string());
    cmd.args.push(format_go_duration(timeout));
    Ok(())
  })
}

/// Register chart repositories given as `name=url`.
///
/// Adds one `helm repo add` per entry followed by a single `helm repo update`.
/// An empty list adds nothing, not even the update.
pub fn with_helm_repos(repos: impl IntoIterator<Item = impl Into<String>>) -> HelmOption {
  let repos = owned(repos);
  option(move |cmd| {
    if repos.is_empty() {
      return Ok(());
    }

    let mut added = Vec::with_capacity(repos.len() + 1);
    for repo in &repos {
      let (name, url) = split_key_value(repo)?;
      info!(name = %name, url = %url, "added repo");
      added.push(helm_cmd(&["repo", "add", name, url]));
    }
    added.push(helm_cmd(&["repo", "update"]));

    cmd.pre_cmds.extend(added);
    Ok(())
  })
}

/// Pre-command `helm dependency build <chart>`.
pub fn with_build_dependencies(build: bool, chart: impl Into<String>) -> HelmOption {
  let chart = chart.into();
  option(move |cmd| {
    if build {
      cmd.pre_cmds.push(helm_cmd(&["dependency", "build", chart.as_str()]));
    }
    Ok(())
  })
}

/// Pre-command `helm dependency update <chart>`.
pub fn with_update_dependencies(update: bool, chart: impl Into<String>) -> HelmOption {
  let chart = chart.into();
  option(move |cmd| {
    if update {
      cmd.pre_cmds.push(helm_cmd(&["dependency", "update", chart.as_str()]));
    }
    Ok(())
  })
}

/// Run `helm test --logs <release>` after a successful deploy.
pub fn with_test(test: bool) -> HelmOption {
  option(move |cmd| {
    cmd.test = test;
    Ok(())
  })
}

/// Roll the release back when the post-deploy test fails.
pub fn with_test_rollback(rollback: bool) -> HelmOption {
  option(move |cmd| {
    cmd.test_rollback = rollback;
    Ok(())
  })
}

/// One `--set key=value` per entry.
pub fn with_values(values: impl IntoIterator<Item = impl Into<String>>) -> HelmOption {
  set_values("--set", owned(values))
}

/// One `--set-string key=value` per entry.
pub fn with_values_string(values: impl IntoIterator<Item = impl Into<String>>) -> HelmOption {
  set_values("--set-string", owned(values))
}

fn set_values(flag: &'static str, values: Vec<String>) -> HelmOption {
  option(move |cmd| {
    for value in &values {
      let (key, value) = split_key_value(value)?;
      cmd.args.push(flag.to_string());
      cmd.args.push(format!("{}={}", key, value));
    }
    Ok(())
  })
}

/// `--values <file>`, skipped when `file` is empty.
pub fn with_values_yaml(file: impl Into<String>) -> HelmOption {
  let file = file.into();
  option(move |cmd| {
    if !file.is_empty() {
      cmd.args.push("--values".to_string());
      cmd.args.push(file);
    }
    Ok(())
  })
}

/// `--kubeconfig <path>`, skipped when `config` is empty.
pub fn with_kube_config(config: impl Into<String>) -> HelmOption {
  let config = config.into();
  option(move |cmd| {
    if !config.is_empty() {
      cmd.args.push("--kubeconfig".to_string());
      cmd.args.push(config);
    }
    Ok(())
  })
}

/// Run `command` (executable first) before any `helm` invocation.
pub fn with_pre_command(command: impl IntoIterator<Item = impl Into<String>>) -> HelmOption {
  let command = owned(command);
  option(move |cmd| {
    if command.is_empty() {
      return Err(OptionError::EmptyCommand);
    }
    cmd.pre_cmds.push(command);
    Ok(())
  })
}

/// Run `command` (executable first) after the deploy and any test step.
pub fn with_post_command(command: impl IntoIterator<Item = impl Into<String>>) -> HelmOption {
  let command = owned(command);
  option(move |cmd| {
    if command.is_empty() {
      return Err(OptionError::EmptyCommand);
    }
    cmd.post_cmds.push(command);
    Ok(())
  })
}
