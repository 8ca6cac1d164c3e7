//! Release flags shared by every subcommand.
//!
//! Flags layer on top of the deploy file given with `--config`: scalar flags
//! replace file values, list flags extend them and boolean flags can only
//! switch a setting on.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use helmrun_lib::DeployConfig;

#[derive(Args, Debug, Default, Clone)]
pub struct DeployArgs {
  /// Release name
  #[arg(short, long, env = "HELMRUN_RELEASE")]
  pub release: Option<String>,

  /// Chart path or reference (required for upgrade)
  #[arg(long, env = "HELMRUN_CHART")]
  pub chart: Option<String>,

  /// Kubernetes namespace
  #[arg(short, long, env = "HELMRUN_NAMESPACE")]
  pub namespace: Option<String>,

  /// Path to the kubeconfig file
  #[arg(long, env = "HELMRUN_KUBECONFIG")]
  pub kubeconfig: Option<String>,

  /// Lint the chart before deploying
  #[arg(long, env = "HELMRUN_LINT")]
  pub lint: bool,

  /// Pass --atomic to helm
  #[arg(long, env = "HELMRUN_ATOMIC")]
  pub atomic: bool,

  /// Pass --wait to helm
  #[arg(long, env = "HELMRUN_WAIT")]
  pub wait: bool,

  /// Pass --force to helm
  #[arg(long, env = "HELMRUN_FORCE")]
  pub force: bool,

  /// Pass --cleanup-on-fail to helm
  #[arg(long, env = "HELMRUN_CLEANUP_ON_FAIL")]
  pub cleanup_on_fail: bool,

  /// Pass --dry-run to helm
  #[arg(long, env = "HELMRUN_DRY_RUN")]
  pub dry_run: bool,

  /// Helm operation timeout (e.g., "90s", "5m")
  #[arg(long, value_parser = humantime::parse_duration, env = "HELMRUN_TIMEOUT")]
  pub timeout: Option<Duration>,

  /// Set a chart value (repeatable)
  #[arg(long = "set", value_name = "KEY=VALUE")]
  pub values: Vec<String>,

  /// Set a chart value as a string (repeatable)
  #[arg(long = "set-string", value_name = "KEY=VALUE")]
  pub values_string: Vec<String>,

  /// Values file passed with --values
  #[arg(short = 'f', long = "values", value_name = "FILE", env = "HELMRUN_VALUES")]
  pub values_yaml: Option<String>,

  /// Chart repository to add before deploying (repeatable)
  #[arg(long = "repo", value_name = "NAME=URL")]
  pub helm_repos: Vec<String>,

  /// Run `helm dependency build` on the chart first
  #[arg(long, env = "HELMRUN_BUILD_DEPENDENCIES")]
  pub build_dependencies: bool,

  /// Run `helm dependency update` on the chart first
  #[arg(long, env = "HELMRUN_UPDATE_DEPENDENCIES")]
  pub update_dependencies: bool,

  /// Run `helm test` after deploying
  #[arg(long, env = "HELMRUN_TEST")]
  pub test: bool,

  /// Roll back when `helm test` fails
  #[arg(long, env = "HELMRUN_TEST_ROLLBACK")]
  pub test_rollback: bool,

  /// Command to run before helm, split on whitespace (repeatable).
  /// Quoting is not supported; use `pre-commands` in the deploy file instead
  #[arg(long = "pre", value_name = "COMMAND", value_parser = parse_command)]
  pub pre_commands: Vec<String>,

  /// Command to run after helm, split on whitespace (repeatable).
  /// Quoting is not supported; use `post-commands` in the deploy file instead
  #[arg(long = "post", value_name = "COMMAND", value_parser = parse_command)]
  pub post_commands: Vec<String>,
}

impl DeployArgs {
  /// Layer these flags on top of `config`.
  pub fn merge_into(self, config: &mut DeployConfig) {
    replace(&mut config.release, self.release);
    replace(&mut config.chart, self.chart);
    replace_opt(&mut config.namespace, self.namespace);
    replace_opt(&mut config.kubeconfig, self.kubeconfig);
    replace_opt(&mut config.values_yaml, self.values_yaml);
    replace_opt(
      &mut config.timeout,
      self.timeout.map(|t| humantime::format_duration(t).to_string()),
    );

    config.lint |= self.lint;
    config.atomic |= self.atomic;
    config.wait |= self.wait;
    config.force |= self.force;
    config.cleanup_on_fail |= self.cleanup_on_fail;
    config.dry_run |= self.dry_run;
    config.build_dependencies |= self.build_dependencies;
    config.update_dependencies |= self.update_dependencies;
    config.test |= self.test;
    config.test_rollback |= self.test_rollback;

    config.values.extend(self.values);
    config.values_string.extend(self.values_string);
    config.helm_repos.extend(self.helm_repos);
    config.pre_commands.extend(self.pre_commands.iter().map(|c| split_command(c)));
    config.post_commands.extend(self.post_commands.iter().map(|c| split_command(c)));
  }
}

/// Read the deploy file, if any, and apply the command-line flags on top.
pub fn load_deploy_config(path: Option<&Path>, args: DeployArgs) -> Result<DeployConfig> {
  let mut config = match path {
    Some(path) => DeployConfig::load(path).context("Failed to load deploy config")?,
    None => DeployConfig::default(),
  };

  args.merge_into(&mut config);
  debug!(release = %config.release, chart = %config.chart, "resolved deploy config");

  Ok(config)
}

fn replace(target: &mut String, value: Option<String>) {
  if let Some(value) = value {
    *target = value;
  }
}

fn replace_opt(target: &mut Option<String>, value: Option<String>) {
  if value.is_some() {
    *target = value;
  }
}

/// Accept a whitespace-separated command line, rejecting shell quoting.
fn parse_command(command: &str) -> Result<String, String> {
  if command.contains(['\'', '"']) {
    return Err("quoted arguments are not supported here; list the command in the deploy file instead".to_string());
  }
  Ok(command.to_string())
}

fn split_command(command: &str) -> Vec<String> {
  command.split_whitespace().map(str::to_string).collect()
}
