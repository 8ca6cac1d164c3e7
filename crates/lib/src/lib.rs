//! helmrun-lib: build and run helm release pipelines
//!
//! This crate provides the pieces the `helmrun` CLI is assembled from:
//! - `HelmCmd`: a validated descriptor of one `helm upgrade --install` or
//!   `helm rollback` invocation plus the commands around it
//! - `Runner`: the pluggable process executor every command is sent through
//! - `RunContext`: cancellation and deadline shared by all commands of a run
//! - `DeployConfig`: the JSON/YAML deploy file format

pub mod command;
pub mod config;
pub mod execute;
pub mod runner;
pub mod util;

pub use command::{BuildError, HelmCmd, HelmOption, Invocation, Mode, OptionError, Phase};
pub use config::{ConfigError, DeployConfig};
pub use execute::RunError;
pub use runner::{CancelHandle, Done, ProcessRunner, RunContext, Runner, RunnerError};
