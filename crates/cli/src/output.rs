//! CLI output formatting utilities.
//!
//! Colored status lines for run outcomes, JSON output for `plan`, and
//! human-readable run durations.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Kind of status line. Success and info go to stdout, problems to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
  Success,
  Info,
  Warning,
  Error,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => symbols::SUCCESS,
      Status::Info => symbols::INFO,
      Status::Warning => symbols::WARNING,
      Status::Error => symbols::ERROR,
    }
  }

  fn to_stderr(self) -> bool {
    matches!(self, Status::Warning | Status::Error)
  }

  fn paint(self, text: &str) -> String {
    let stream = if self.to_stderr() { Stream::Stderr } else { Stream::Stdout };
    match self {
      Status::Success => text.if_supports_color(stream, |s| s.green()).to_string(),
      Status::Info => text.if_supports_color(stream, |s| s.blue()).to_string(),
      Status::Warning => text.if_supports_color(stream, |s| s.yellow()).to_string(),
      Status::Error => text.if_supports_color(stream, |s| s.red()).to_string(),
    }
  }

  /// Problems are colored in full; other lines only color the symbol.
  fn line(self, message: &str) -> String {
    let message = if self.to_stderr() { self.paint(message) } else { message.to_string() };
    format!("{} {}", self.paint(self.symbol()), message)
  }

  fn print(self, message: &str) {
    let line = self.line(message);
    if self.to_stderr() {
      eprintln!("{}", line);
    } else {
      println!("{}", line);
    }
  }
}

/// Wall-clock time of a run: `850ms`, `12.40s` or `3m 5s`.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  match secs {
    0 => format!("{}ms", millis),
    1..=59 => format!("{}.{:02}s", secs, millis / 10),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}

pub fn print_success(message: &str) {
  Status::Success.print(message);
}

pub fn print_info(message: &str) {
  Status::Info.print(message);
}

pub fn print_warning(message: &str) {
  Status::Warning.print(message);
}

pub fn print_error(message: &str) {
  Status::Error.print(message);
}

/// Pretty-printed JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")?;
  println!("{}", json);
  Ok(())
}
