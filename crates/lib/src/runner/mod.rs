//! Command runners.
//!
//! A [`Runner`] executes one command line and reports success or failure.
//! Nothing else in the crate spawns processes: the engine hands every pre-command,
//! the main `helm` invocation, the test step, the rollback and every post-command
//! to the runner injected into the descriptor.
//!
//! Two implementations exist:
//! - [`ProcessRunner`] spawns real processes with `tokio::process`
//! - test runners (see `util::testutil`) record invocations without spawning anything

pub mod context;
pub mod process;

use async_trait::async_trait;
use thiserror::Error;

pub use context::{CancelHandle, Done, RunContext};
pub use process::ProcessRunner;

/// Executes a single command line on behalf of the engine.
///
/// Implementations must honor the [`RunContext`]: once it is cancelled or its
/// deadline passes, a running command should be stopped and the call should
/// return [`RunnerError::Cancelled`] or [`RunnerError::DeadlineExceeded`].
#[async_trait]
pub trait Runner: Send + Sync {
  /// Run `program` with `args`, returning once it has finished.
  async fn run(&self, ctx: &RunContext, program: &str, args: &[String]) -> Result<(), RunnerError>;
}

/// Reasons a runner can report for a failed command.
#[derive(Debug, Error)]
pub enum RunnerError {
  /// The program could not be started.
  #[error("failed to spawn {program}: {error}")]
  Spawn {
    program: String,
    error: std::io::Error,
  },

  /// Waiting on a started program failed.
  #[error("failed waiting for {program}: {error}")]
  Wait {
    program: String,
    error: std::io::Error,
  },

  /// The program ran but did not exit successfully.
  #[error("{program} exited with {}", describe_exit(.code))]
  Exit { program: String, code: Option<i32> },

  /// The context was cancelled before or while the program ran.
  #[error("{program} cancelled")]
  Cancelled { program: String },

  /// The context deadline passed before or while the program ran.
  #[error("{program} exceeded deadline")]
  DeadlineExceeded { program: String },

  /// Free-form failure reported by a runner that does not spawn processes.
  #[error("{0}")]
  Other(String),
}

impl RunnerError {
  /// Build the error reported when the context ends before `program` completes.
  pub fn interrupted(program: &str, done: Done) -> Self {
    let program = program.to_string();
    match done {
      Done::Cancelled => RunnerError::Cancelled { program },
      Done::DeadlineExceeded => RunnerError::DeadlineExceeded { program },
    }
  }

  /// Exit code of the failed program, if it exited on its own.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      RunnerError::Exit { code, .. } => *code,
      _ => None,
    }
  }
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit status {}", code),
    None => "no exit status (terminated by signal)".to_string(),
  }
}
