//! Duration strings in the format `helm` parses.
//!
//! `helm` reads `--timeout` with Go's duration parser, which rejects the
//! space-separated output of `humantime`. [`format_go_duration`] renders the
//! compact form Go itself prints: `300ms`, `45s`, `5m0s`, `1h30m0s`.

use std::fmt::Write;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

pub fn format_go_duration(duration: Duration) -> String {
  let nanos = duration.as_nanos();

  if nanos == 0 {
    return "0s".to_string();
  }
  if nanos < NANOS_PER_MICRO {
    return format!("{}ns", nanos);
  }
  if nanos < NANOS_PER_MILLI {
    return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
  }
  if nanos < NANOS_PER_SEC {
    return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
  }

  let total_secs = duration.as_secs();
  let hours = total_secs / 3600;
  let minutes = (total_secs % 3600) / 60;
  let seconds = u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());

  let mut out = String::new();
  if hours > 0 {
    let _ = write!(out, "{}h", hours);
  }
  if hours > 0 || minutes > 0 {
    let _ = write!(out, "{}m", minutes);
  }
  let _ = write!(out, "{}s", decimal(seconds, NANOS_PER_SEC));
  out
}

/// `value / unit` as a decimal with trailing zeros trimmed.
fn decimal(value: u128, unit: u128) -> String {
  let whole = value / unit;
  let fraction = value % unit;
  if fraction == 0 {
    return whole.to_string();
  }

  let width = unit.ilog10() as usize;
  let digits = format!("{:0width$}", fraction, width = width);
  format!("{}.{}", whole, digits.trim_end_matches('0'))
}
