//! Cancellation and deadline context threaded through every runner call.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a [`RunContext`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Done {
  /// [`CancelHandle::cancel`] was called.
  Cancelled,
  /// The context deadline passed.
  DeadlineExceeded,
}

impl fmt::Display for Done {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Done::Cancelled => write!(f, "context cancelled"),
      Done::DeadlineExceeded => write!(f, "context deadline exceeded"),
    }
  }
}

/// Cancellation signal plus an optional deadline.
///
/// Clones share the same cancellation signal, so one [`CancelHandle`] stops every
/// command started with any clone of the context.
#[derive(Debug, Clone)]
pub struct RunContext {
  cancelled: Option<watch::Receiver<bool>>,
  deadline: Option<Instant>,
}

/// Cancels the [`RunContext`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
  tx: watch::Sender<bool>,
}

impl CancelHandle {
  pub fn cancel(&self) {
    self.tx.send_replace(true);
  }
}

impl RunContext {
  /// A context that is never cancelled and has no deadline.
  pub fn background() -> Self {
    Self {
      cancelled: None,
      deadline: None,
    }
  }

  /// A cancellable context and the handle that cancels it.
  pub fn with_cancel() -> (Self, CancelHandle) {
    let (tx, rx) = watch::channel(false);
    let ctx = Self {
      cancelled: Some(rx),
      deadline: None,
    };
    (ctx, CancelHandle { tx })
  }

  /// Add a deadline `timeout` from now.
  pub fn with_timeout(self, timeout: Duration) -> Self {
    self.with_deadline(Instant::now() + timeout)
  }

  /// Add a deadline. An existing earlier deadline is kept.
  pub fn with_deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(match self.deadline {
      Some(current) => current.min(deadline),
      None => deadline,
    });
    self
  }

  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Check whether the context has already ended, without waiting.
  pub fn state(&self) -> Option<Done> {
    if self.cancelled.as_ref().is_some_and(|rx| *rx.borrow()) {
      return Some(Done::Cancelled);
    }
    if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
      return Some(Done::DeadlineExceeded);
    }
    None
  }

  /// Wait until the context ends.
  ///
  /// Never resolves for a background context. A dropped [`CancelHandle`] can no
  /// longer cancel, so only the deadline remains.
  pub async fn done(&self) -> Done {
    let cancelled = async {
      if let Some(rx) = &self.cancelled {
        let mut rx = rx.clone();
        let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if fired {
          return;
        }
      }
      std::future::pending::<()>().await
    };

    let expired = async {
      match self.deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
      }
    };

    tokio::select! {
      _ = cancelled => Done::Cancelled,
      _ = expired => Done::DeadlineExceeded,
    }
  }
}

impl Default for RunContext {
  fn default() -> Self {
    Self::background()
  }
}
