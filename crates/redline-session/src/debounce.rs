//! Trailing-edge debouncer for the suggestion feed.
//!
//! Every keystroke pushes the full normalized text. Only the latest payload
//! matters, so the debouncer waits until pushes stop for `delay` and then
//! forwards that one payload.

use std::time::Duration;

use tokio::{sync::mpsc, time::timeout};
use tracing::debug;

/// Handle to a coalescing task. Dropping it flushes whatever is pending.
pub struct Debouncer {
  tx: mpsc::UnboundedSender<String>,
}

impl Debouncer {
  /// Spawn the coalescer; emissions go to `out`.
  pub fn spawn(delay: Duration, out: mpsc::Sender<String>) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run(delay, rx, out));
    Self { tx }
  }

  /// Replace the pending payload and restart the quiet period.
  pub fn push(&self, payload: impl Into<String>) {
    if self.tx.send(payload.into()).is_err() {
      debug!("debouncer output closed, dropping payload");
    }
  }
}

async fn run(
  delay: Duration,
  mut rx: mpsc::UnboundedReceiver<String>,
  out: mpsc::Sender<String>,
) {
  while let Some(mut latest) = rx.recv().await {
    loop {
      match timeout(delay, rx.recv()).await {
        Ok(Some(next)) => latest = next,
        Ok(None) => {
          let _ = out.send(latest).await;
          return;
        }
        Err(_) => break,
      }
    }
    if out.send(latest).await.is_err() {
      return;
    }
  }
}
