//! The AI review channel: a WebSocket that is kept open for the lifetime of
//! the session.
//!
//! Outbound frames are plain text (the normalized document); inbound frames
//! are relayed untouched as [`ChannelEvent::Message`] and validated by
//! whoever consumes them.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use redline_core::suggestion::ChannelEvent;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{Error, Result};

const CHANNEL_DEPTH: usize = 64;

/// Handle to the background connection task. Dropping it shuts the task
/// down.
pub struct SuggestionSocket {
  outbound: mpsc::Sender<String>,
  events:   mpsc::Receiver<ChannelEvent>,
  task:     JoinHandle<()>,
}

impl SuggestionSocket {
  /// Start connecting to `url`. After every close or failed attempt the
  /// task waits `reconnect` and tries again.
  pub fn spawn(url: impl Into<String>, reconnect: Duration) -> Result<Self> {
    let url = url.into();
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
      return Err(Error::SocketUrl { url });
    }

    let (outbound, outbound_rx) = mpsc::channel(CHANNEL_DEPTH);
    let (events_tx, events) = mpsc::channel(CHANNEL_DEPTH);
    let task = tokio::spawn(run(url, reconnect, outbound_rx, events_tx));
    Ok(Self {
      outbound,
      events,
      task,
    })
  }

  /// Where to push outbound text. Frames pushed while disconnected are
  /// coalesced; only the latest is sent once the connection is back.
  pub fn sender(&self) -> mpsc::Sender<String> { self.outbound.clone() }

  /// The next connection event. `None` once the task has stopped.
  pub async fn recv(&mut self) -> Option<ChannelEvent> { self.events.recv().await }
}

impl Drop for SuggestionSocket {
  fn drop(&mut self) { self.task.abort(); }
}

// ─── Connection task ─────────────────────────────────────────────────────────

async fn run(
  url: String,
  reconnect: Duration,
  mut outbound: mpsc::Receiver<String>,
  events: mpsc::Sender<ChannelEvent>,
) {
  loop {
    match connect_async(url.as_str()).await {
      Ok((ws, _)) => {
        info!(%url, "suggestion channel open");
        if events.send(ChannelEvent::Open).await.is_err() {
          return;
        }
        let (mut sink, mut stream) = ws.split();

        if let Some(text) = latest_pending(&mut outbound)
          && let Err(e) = sink.send(Message::Text(text)).await
        {
          warn!("suggestion channel send failed: {e}");
        }

        loop {
          tokio::select! {
            out = outbound.recv() => match out {
              Some(text) => {
                if let Err(e) = sink.send(Message::Text(text)).await {
                  warn!("suggestion channel send failed: {e}");
                  break;
                }
              }
              None => {
                let _ = sink.close().await;
                return;
              }
            },
            frame = stream.next() => match frame {
              Some(Ok(Message::Text(text))) => {
                if events.send(ChannelEvent::Message(text)).await.is_err() {
                  return;
                }
              }
              Some(Ok(Message::Close(_))) | None => break,
              Some(Ok(_)) => {}
              Some(Err(e)) => {
                warn!("suggestion channel read failed: {e}");
                break;
              }
            },
          }
        }

        info!(%url, "suggestion channel closed");
        if events.send(ChannelEvent::Closed).await.is_err() {
          return;
        }
      }
      Err(e) => warn!(%url, "suggestion channel connect failed: {e}"),
    }

    if events.is_closed() {
      return;
    }
    debug!(?reconnect, "reconnecting suggestion channel");
    tokio::time::sleep(reconnect).await;
  }
}

/// Drain everything queued while disconnected, keeping the newest frame.
fn latest_pending(outbound: &mut mpsc::Receiver<String>) -> Option<String> {
  let mut latest = None;
  while let Ok(text) = outbound.try_recv() {
    latest = Some(text);
  }
  latest
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn rejects_non_websocket_url() {
    match SuggestionSocket::spawn("http://localhost:8000/ws", Duration::from_millis(10)) {
      Err(Error::SocketUrl { url }) => assert_eq!(url, "http://localhost:8000/ws"),
      Err(other) => panic!("unexpected error {other}"),
      Ok(_) => panic!("http url accepted"),
    }
  }

  #[tokio::test]
  async fn latest_pending_keeps_newest() {
    let (tx, mut rx) = mpsc::channel(4);
    tx.send("a".to_string()).await.unwrap();
    tx.send("b".to_string()).await.unwrap();
    assert_eq!(latest_pending(&mut rx).as_deref(), Some("b"));
    assert_eq!(latest_pending(&mut rx), None);
  }
}
