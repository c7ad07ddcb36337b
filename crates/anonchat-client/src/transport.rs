//! Transport seam and the built-in WebSocket transport.
//!
//! The client talks to the wire through the [`Transport`] trait so tests
//! (and alternative backends) can inject their own implementation. The
//! default backend is tokio-tungstenite.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use anonchat_core::error::{AnonchatError, Result};

/// Bidirectional text transport.
///
/// `send` must be safe to call from multiple tasks concurrently (the
/// protocol has no support for interleaved partial frames, so impls
/// serialize writers). `recv` is consumed by exactly one task: the
/// session's dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one text frame.
    async fn send(&self, text: &str) -> Result<()>;
    /// Next inbound text frame; `None` once the remote end disconnects.
    async fn recv(&self) -> Option<String>;
    /// Close the transport. Idempotent.
    async fn close(&self) -> Result<()>;
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// WebSocket transport over tokio-tungstenite.
pub struct WsTransport {
    write: Mutex<WsSink>,
    read: Mutex<WsSource>,
}

impl WsTransport {
    /// Open a WebSocket connection to `uri`.
    pub async fn connect(uri: &str) -> Result<Self> {
        let (socket, _resp) = connect_async(uri)
            .await
            .map_err(|e| AnonchatError::Connection(e.to_string()))?;
        let (write, read) = socket.split();
        Ok(Self {
            write: Mutex::new(write),
            read: Mutex::new(read),
        })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, text: &str) -> Result<()> {
        let mut write = self.write.lock().await;
        write
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| AnonchatError::Connection(e.to_string()))
    }

    async fn recv(&self) -> Option<String> {
        let mut read = self.read.lock().await;
        loop {
            match read.next().await? {
                Ok(Message::Text(text)) => return Some(text),
                Ok(Message::Close(_)) | Err(_) => return None,
                // Protocol keepalive rides on text frames; websocket-level
                // ping/pong is answered by tungstenite itself.
                Ok(other) => {
                    debug!(kind = ?other, "ignoring non-text frame");
                }
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let mut write = self.write.lock().await;
        let _ = write.send(Message::Close(None)).await;
        Ok(())
    }
}
