//! Session lifecycle and the public client surface.
//!
//! One [`Client`] owns one logical session. The receive path runs as a
//! single ordered background task (see [`crate::dispatch`]); sends may be
//! issued concurrently from multiple tasks while it runs. All session
//! state is scoped to the instance, so multiple clients coexist freely.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tracing::debug;

use anonchat_core::correlate::response_id;
use anonchat_core::error::{AnonchatError, Result};
use anonchat_core::protocol::envelope::Envelope;
use anonchat_core::protocol::frame;

use crate::auth::{self, Credentials, Fingerprint};
use crate::config;
use crate::dispatch;
use crate::pending::PendingResponses;
use crate::transport::{Transport, WsTransport};

/// Session lifecycle states.
///
/// `LoggingIn` and `Ready` are reached through handshake sequencing when
/// auto-login is enabled; with auto-login off the session stays
/// `Connected` until the caller drives its own login and the
/// namespace-connect confirmation arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    LoggingIn,
    Ready,
}

pub(crate) struct Inner {
    pub(crate) autologin: bool,
    pub(crate) transport: RwLock<Option<Arc<dyn Transport>>>,
    pub(crate) pending: PendingResponses,
    pub(crate) inbound_tx: mpsc::UnboundedSender<String>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<String>>,
    state_tx: watch::Sender<SessionState>,
}

impl Inner {
    pub(crate) fn set_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }

    /// Transition to `Ready` exactly once per session.
    pub(crate) fn mark_ready(&self) {
        let already = *self.state_tx.borrow() == SessionState::Ready;
        if !already {
            self.state_tx.send_replace(SessionState::Ready);
        }
    }

    /// Tear the session down: close and clear the transport, abandon all
    /// pending responses (never resolved), become `Disconnected`.
    pub(crate) async fn teardown(&self) {
        let transport = self.transport.write().await.take();
        if let Some(t) = transport {
            let _ = t.close().await;
        }
        self.pending.abandon();
        self.set_state(SessionState::Disconnected);
    }

    async fn live_transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport
            .read()
            .await
            .clone()
            .ok_or(AnonchatError::NotConnected)
    }
}

/// Async client for the chat service.
///
/// Cheap to clone; clones share the same session, so sends can be issued
/// from multiple tasks while the receive loop runs independently.
#[derive(Clone)]
pub struct Client {
    uri: String,
    inner: Arc<Inner>,
}

impl Client {
    /// Build a client from caller credentials, with auto-login enabled.
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_autologin(credentials, true)
    }

    /// Build a client, choosing whether the session answers the handshake
    /// open frame with a login on its own.
    pub fn with_autologin(credentials: &Credentials, autologin: bool) -> Self {
        let fingerprint = Fingerprint::generate().with_credentials(credentials);
        let uri = auth::build_uri(config::BASE_URL, &fingerprint);
        Self::from_parts(uri, autologin)
    }

    /// Build a client from a prebuilt connection URI carrying `cookie` and
    /// `secret` query parameters.
    pub fn from_uri(uri: impl Into<String>, autologin: bool) -> Result<Self> {
        let uri = uri.into();
        auth::credentials_from_uri(&uri)?;
        Ok(Self::from_parts(uri, autologin))
    }

    fn from_parts(uri: String, autologin: bool) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            uri,
            inner: Arc::new(Inner {
                autologin,
                transport: RwLock::new(None),
                pending: PendingResponses::new(),
                inbound_tx,
                inbound_rx: Mutex::new(inbound_rx),
                state_tx,
            }),
        }
    }

    /// Connection URI (with flattened query string).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.inner.state_tx.borrow()
    }

    /// Open the transport and start the receive loop.
    ///
    /// Connection failures surface as `Connection` and are not retried
    /// here; retry policy belongs to the caller.
    pub async fn connect(&self) -> Result<()> {
        self.inner.set_state(SessionState::Connecting);
        match WsTransport::connect(&self.uri).await {
            Ok(ws) => {
                self.connect_with(Arc::new(ws)).await;
                Ok(())
            }
            Err(e) => {
                self.inner.set_state(SessionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Attach an already-open transport and start the receive loop. This
    /// is the seam for custom transport backends.
    pub async fn connect_with(&self, transport: Arc<dyn Transport>) {
        *self.inner.transport.write().await = Some(transport.clone());
        self.inner.set_state(SessionState::Connected);
        tokio::spawn(dispatch::run(self.inner.clone(), transport));
    }

    /// Close the session. Idempotent: disconnecting an already
    /// disconnected client is a no-op. All pending responses are
    /// abandoned, never resolved.
    pub async fn disconnect(&self) {
        self.inner.teardown().await;
    }

    /// Wait until the session reaches `Ready` (login confirmed). Errors
    /// with `NotConnected` if the session disconnects first. Call after
    /// [`connect`](Self::connect).
    pub async fn wait_ready(&self) -> Result<()> {
        let mut rx = self.inner.state_tx.subscribe();
        let state = rx
            .wait_for(|s| {
                matches!(s, SessionState::Ready | SessionState::Disconnected)
            })
            .await
            .map(|s| *s)
            .map_err(|_| AnonchatError::NotConnected)?;
        match state {
            SessionState::Ready => Ok(()),
            _ => Err(AnonchatError::NotConnected),
        }
    }

    /// Fire-and-forget send of a pre-encoded frame.
    pub async fn send(&self, text: &str) -> Result<()> {
        let transport = self.inner.live_transport().await?;
        debug!(frame = text, "fire and forget");
        transport.send(text).await
    }

    /// Send an envelope and suspend until the correlated response arrives.
    ///
    /// No internal timeout is applied: callers own timeout/cancellation
    /// policy. If the session disconnects while waiting, the call errors
    /// instead of hanging.
    pub async fn request(
        &self,
        id: u64,
        method: Option<&str>,
        params: Option<Value>,
    ) -> Result<Value> {
        let envelope = Envelope {
            id,
            method: method.map(str::to_string),
            params,
        };
        self.send_awaiting(id, &envelope.encode()).await
    }

    /// Send a pre-encoded frame and suspend until the correlated response
    /// arrives. The request id is recovered from the frame text.
    pub async fn request_raw(&self, text: &str) -> Result<Value> {
        let id = frame::decode(text)?.id();
        self.send_awaiting(id, text).await
    }

    async fn send_awaiting(&self, id: u64, text: &str) -> Result<Value> {
        let transport = self.inner.live_transport().await?;
        let correlation_id = response_id(id);
        let rx = self.inner.pending.register(correlation_id)?;

        debug!(id, correlation_id, frame = text, "send awaiting response");
        if let Err(e) = transport.send(text).await {
            self.inner.pending.discard(correlation_id);
            return Err(e);
        }

        rx.await.map_err(|_| {
            AnonchatError::Connection("session closed while awaiting response".into())
        })
    }

    /// Next raw inbound frame from the general-purpose stream.
    ///
    /// Every non-keepalive frame is delivered here in arrival order,
    /// buffered without bound until consumed. Returns `None` only when
    /// the client itself is dropped mid-recv, which does not occur in
    /// normal use.
    pub async fn next_message(&self) -> Option<String> {
        self.inner.inbound_rx.lock().await.recv().await
    }
}
