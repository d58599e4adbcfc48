//! Listener for the backend's `/ws/queue` push channel.
//!
//! The backend sends the whole queue on every change, so only the newest
//! message matters. A [`watch`](tokio::sync::watch) channel holds exactly
//! that, and readers that fall behind skip straight to the latest queue.

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info};

use crate::AbortGuard;

/// One WebSocket connection that keeps only the most recent JSON message.
///
/// Messages that fail to parse are logged and skipped. Dropping the socket
/// aborts its connection task, which closes the connection.
pub struct QueueSocket {
    latest: watch::Receiver<Option<Value>>,
    task: AbortGuard,
}

impl QueueSocket {
    /// Open a connection to `url` in the background.
    pub fn connect(url: impl Into<String>) -> Self {
        let url = url.into();
        let (tx, rx) = watch::channel(None);
        let task = AbortGuard::new(tokio::spawn(listen(url, tx)));
        Self { latest: rx, task }
    }

    /// Most recent message, if any arrived yet.
    pub fn latest(&self) -> Option<Value> {
        self.latest.borrow().clone()
    }

    /// Wait for the next message. Returns `None` once the connection is gone.
    pub async fn next_message(&mut self) -> Option<Value> {
        self.latest.changed().await.ok()?;
        self.latest.borrow_and_update().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

async fn listen(url: String, tx: watch::Sender<Option<Value>>) {
    let mut ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            error!(%url, error = %e, "WebSocket error");
            return;
        }
    };
    info!(%url, "WebSocket connected");
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    tx.send_replace(Some(value));
                }
                Err(e) => error!(error = %e, "Failed to parse WebSocket message"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "WebSocket error");
                break;
            }
        }
    }
    info!(%url, "WebSocket disconnected");
}
