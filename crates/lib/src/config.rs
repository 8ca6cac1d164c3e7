//! Deploy configuration files.
//!
//! A [`DeployConfig`] describes one release in JSON or YAML and expands into the
//! ordered option list [`HelmCmd::new`](crate::command::HelmCmd::new) consumes.
//!
//! ```yaml
//! release: web
//! chart: ./charts/web
//! namespace: prod
//! atomic: true
//! timeout: 5m
//! helm-repos:
//!   - bitnami=https://charts.bitnami.com/bitnami
//! values:
//!   - image.tag=1.2.3
//! test: true
//! test-rollback: true
//! post-commands:
//!   - [./scripts/notify.sh, deployed]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::command::{
  HelmOption, with_atomic, with_build_dependencies, with_chart, with_cleanup_on_fail, with_dry_run, with_force,
  with_helm_repos, with_kube_config, with_lint, with_namespace, with_post_command, with_pre_command, with_release,
  with_runner, with_test, with_test_rollback, with_timeout, with_update_dependencies, with_values, with_values_string,
  with_values_yaml, with_wait,
};
use crate::runner::Runner;

/// Errors loading or expanding a deploy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {error}", .path.display())]
  Read {
    path: PathBuf,
    error: std::io::Error,
  },

  #[error("failed to parse {}: {error}", .path.display())]
  Json {
    path: PathBuf,
    error: serde_json::Error,
  },

  #[error("failed to parse {}: {error}", .path.display())]
  Yaml {
    path: PathBuf,
    error: serde_yaml::Error,
  },

  #[error("unsupported config format: {} (expected .json, .yaml or .yml)", .0.display())]
  UnsupportedFormat(PathBuf),

  #[error("invalid timeout {value:?}: {error}")]
  Timeout {
    value: String,
    error: humantime::DurationError,
  },
}

/// One release, as written in a deploy file.
///
/// Every field is optional in the file. Keys are kebab-case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeployConfig {
  pub release: String,
  pub chart: String,
  pub namespace: Option<String>,
  pub kubeconfig: Option<String>,
  pub lint: bool,
  pub atomic: bool,
  pub wait: bool,
  pub force: bool,
  pub cleanup_on_fail: bool,
  pub dry_run: bool,
  /// humantime syntax, e.g. `90s`, `5m` or `1h 30m`.
  pub timeout: Option<String>,
  /// `key=value` entries passed as `--set`.
  pub values: Vec<String>,
  /// `key=value` entries passed as `--set-string`.
  pub values_string: Vec<String>,
  pub values_yaml: Option<String>,
  /// `name=url` entries.
  pub helm_repos: Vec<String>,
  pub build_dependencies: bool,
  pub update_dependencies: bool,
  pub test: bool,
  pub test_rollback: bool,
  pub pre_commands: Vec<Vec<String>>,
  pub post_commands: Vec<Vec<String>>,
}

impl DeployConfig {
  /// Load a deploy file, choosing the parser from the extension.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let format = Format::from_path(path)?;
    let contents = fs::read_to_string(path).map_err(|error| ConfigError::Read {
      path: path.to_path_buf(),
      error,
    })?;

    debug!(path = %path.display(), "loading deploy config");
    Self::parse(path, &contents, format)
  }

  fn parse(path: &Path, contents: &str, format: Format) -> Result<Self, ConfigError> {
    match format {
      Format::Json => serde_json::from_str(contents).map_err(|error| ConfigError::Json {
        path: path.to_path_buf(),
        error,
      }),
      Format::Yaml => serde_yaml::from_str(contents).map_err(|error| ConfigError::Yaml {
        path: path.to_path_buf(),
        error,
      }),
    }
  }

  /// The parsed timeout, if one is set.
  pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
    self
      .timeout
      .as_deref()
      .map(|value| {
        humantime::parse_duration(value).map_err(|error| ConfigError::Timeout {
          value: value.to_string(),
          error,
        })
      })
      .transpose()
  }

  /// Expand into the option list for [`HelmCmd::new`](crate::command::HelmCmd::new).
  ///
  /// Identity options come first so that chart-dependent options (lint) see the
  /// configured chart. Repositories and dependency commands precede lint, so the
  /// pre-commands fetch, build and then lint.
  pub fn options(&self, runner: Arc<dyn Runner>) -> Result<Vec<HelmOption>, ConfigError> {
    let timeout = self.timeout()?;

    let mut options = vec![
      with_release(self.release.as_str()),
      with_chart(self.chart.as_str()),
      with_runner(runner),
    ];

    if let Some(namespace) = self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
      options.push(with_namespace(namespace));
    }
    options.push(with_kube_config(self.kubeconfig.clone().unwrap_or_default()));
    options.push(with_helm_repos(self.helm_repos.clone()));
    options.push(with_build_dependencies(self.build_dependencies, self.chart.as_str()));
    options.push(with_update_dependencies(self.update_dependencies, self.chart.as_str()));
    options.push(with_lint(self.lint));
    options.push(with_atomic(self.atomic));
    options.push(with_wait(self.wait));
    options.push(with_force(self.force));
    options.push(with_cleanup_on_fail(self.cleanup_on_fail));
    options.push(with_dry_run(self.dry_run));
    if let Some(timeout) = timeout {
      options.push(with_timeout(timeout));
    }
    options.push(with_values(self.values.clone()));
    options.push(with_values_string(self.values_string.clone()));
    options.push(with_values_yaml(self.values_yaml.clone().unwrap_or_default()));
    options.push(with_test(self.test));
    options.push(with_test_rollback(self.test_rollback));
    options.extend(self.pre_commands.iter().map(|command| with_pre_command(command.clone())));
    options.extend(self.post_commands.iter().map(|command| with_post_command(command.clone())));

    Ok(options)
  }
}

#[derive(Debug, Clone, Copy)]
enum Format {
  Json,
  Yaml,
}

impl Format {
  fn from_path(path: &Path) -> Result<Self, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => Ok(Format::Json),
      Some("yaml") | Some("yml") => Ok(Format::Yaml),
      _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
  }
}
