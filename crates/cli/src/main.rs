mod args;
mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::args::{DeployArgs, load_deploy_config};
use crate::cmd::{PlanMode, cmd_plan, cmd_rollback, cmd_upgrade};
use crate::output::OutputFormat;

/// helmrun - run helm releases with their surrounding steps
#[derive(Parser)]
#[command(name = "helmrun")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Deploy file to read release settings from (.json, .yaml or .yml)
  #[arg(short, long, global = true, env = "HELMRUN_CONFIG")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Install or upgrade a release
  Upgrade {
    #[command(flatten)]
    deploy: DeployArgs,

    /// Abort the whole run after this long (e.g., "10m", "1h 30m")
    #[arg(long, value_parser = humantime::parse_duration, env = "HELMRUN_DEADLINE")]
    deadline: Option<Duration>,
  },

  /// Roll a release back to its previous revision
  Rollback {
    #[command(flatten)]
    deploy: DeployArgs,

    /// Abort the whole run after this long (e.g., "10m", "1h 30m")
    #[arg(long, value_parser = humantime::parse_duration, env = "HELMRUN_DEADLINE")]
    deadline: Option<Duration>,
  },

  /// Show the commands a run would issue, without running anything
  Plan {
    #[command(flatten)]
    deploy: DeployArgs,

    /// Which main command to plan
    #[arg(long, value_enum, default_value = "upgrade")]
    mode: PlanMode,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config_path = cli.config.as_deref();

  match cli.command {
    Commands::Upgrade { deploy, deadline } => cmd_upgrade(load_deploy_config(config_path, deploy)?, deadline),
    Commands::Rollback { deploy, deadline } => cmd_rollback(load_deploy_config(config_path, deploy)?, deadline),
    Commands::Plan { deploy, mode, output } => cmd_plan(load_deploy_config(config_path, deploy)?, mode, output),
  }
}
