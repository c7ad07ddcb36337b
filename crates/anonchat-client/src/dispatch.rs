//! Inbound dispatcher: the single consumer of transport text.
//!
//! Frames are processed strictly in arrival order, one at a time:
//! 1. keepalive ping is answered with pong before anything else (it is
//!    not one of the decodable shapes, so it is checked before decoding)
//!    and is neither enqueued nor decoded;
//! 2. everything else is published to the general inbound stream;
//! 3. then decoded — malformed input is logged and dropped, never fatal;
//! 4. handshake sequencing runs on the raw prefix;
//! 5. finally the frame id is offered to the pending-response table.
//!
//! The loop ends only on transport closure, after which the session tears
//! down: pending responses are abandoned and the state becomes
//! `Disconnected`.

use std::sync::Arc;

use tracing::{debug, warn};

use anonchat_core::protocol::frame;
use anonchat_core::protocol::{CONNECT_PREFIX, LOGIN_FRAME, OPEN_PREFIX, PING, PONG};

use crate::client::{Inner, SessionState};
use crate::transport::Transport;

pub(crate) async fn run(inner: Arc<Inner>, transport: Arc<dyn Transport>) {
    while let Some(raw) = transport.recv().await {
        if raw == PING {
            if let Err(e) = transport.send(PONG).await {
                warn!(error = %e, "pong send failed");
                break;
            }
            continue;
        }

        // At-least-once delivery to the single stream consumer; frames
        // accumulate unbounded if nobody is reading.
        let _ = inner.inbound_tx.send(raw.clone());

        handle_frame(&inner, &transport, &raw).await;
    }

    debug!("transport closed");
    inner.teardown().await;
}

async fn handle_frame(inner: &Inner, transport: &Arc<dyn Transport>, raw: &str) {
    // Handshake sequencing: the open frame triggers the login ack, the
    // namespace-connect confirmation marks the session ready. With
    // auto-login enabled those frames never reach response correlation.
    if inner.autologin && raw.starts_with(OPEN_PREFIX) {
        debug!("open frame received, sending login");
        if let Err(e) = transport.send(LOGIN_FRAME).await {
            warn!(error = %e, "login send failed");
            return;
        }
        inner.set_state(SessionState::LoggingIn);
        return;
    }

    if raw.starts_with(CONNECT_PREFIX) {
        inner.mark_ready();
        if inner.autologin {
            return;
        }
    }

    let decoded = match frame::decode(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "dropping frame");
            return;
        }
    };

    let id = decoded.id();
    if !inner.pending.resolve(id, decoded.payload()) {
        debug!(id, "no pending response for frame");
    }
}
