//! End-to-end session tests over an in-memory transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::timeout;

use anonchat_client::{Client, SessionState, Transport};
use anonchat_core::AnonchatError;

const TEST_URI: &str = "wss://example.test/socket.io/?cookie=c1&secret=s1";

/// Scripted transport: the test feeds inbound frames through a channel and
/// observes everything the client writes.
struct MockTransport {
    inbound: Mutex<mpsc::UnboundedReceiver<String>>,
    outbound: mpsc::UnboundedSender<String>,
    closed: watch::Sender<bool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, text: &str) -> anonchat_core::Result<()> {
        if *self.closed.borrow() {
            return Err(AnonchatError::NotConnected);
        }
        self.outbound
            .send(text.to_string())
            .map_err(|_| AnonchatError::NotConnected)
    }

    async fn recv(&self) -> Option<String> {
        let mut inbound = self.inbound.lock().await;
        let mut closed = self.closed.subscribe();
        tokio::select! {
            frame = inbound.recv() => frame,
            _ = closed.wait_for(|c| *c) => None,
        }
    }

    async fn close(&self) -> anonchat_core::Result<()> {
        self.closed.send_replace(true);
        Ok(())
    }
}

struct Harness {
    client: Client,
    feed: mpsc::UnboundedSender<String>,
    sent: mpsc::UnboundedReceiver<String>,
}

impl Harness {
    async fn connect(autologin: bool) -> Self {
        // RUST_LOG=debug makes the dispatcher visible when a test hangs.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let (feed, inbound) = mpsc::unbounded_channel();
        let (outbound, sent) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        let transport = Arc::new(MockTransport {
            inbound: Mutex::new(inbound),
            outbound,
            closed,
        });

        let client = Client::from_uri(TEST_URI, autologin).unwrap();
        client.connect_with(transport).await;
        Harness { client, feed, sent }
    }

    fn feed(&self, frame: &str) {
        self.feed.send(frame.to_string()).unwrap();
    }

    async fn next_sent(&mut self) -> String {
        timeout(Duration::from_secs(1), self.sent.recv())
            .await
            .expect("timed out waiting for outbound frame")
            .expect("outbound channel closed")
    }

    async fn next_inbound(&self) -> String {
        timeout(Duration::from_secs(1), self.client.next_message())
            .await
            .expect("timed out waiting for inbound frame")
            .expect("inbound stream closed")
    }
}

#[tokio::test]
async fn keepalive_ping_gets_pong_and_nothing_else() {
    let mut h = Harness::connect(false).await;

    h.feed("2");
    assert_eq!(h.next_sent().await, "3");

    // The ping is not forwarded to the inbound stream: the next frame the
    // stream yields is the one fed after it.
    h.feed("421[typing]");
    assert_eq!(h.next_inbound().await, "421[typing]");
}

#[tokio::test]
async fn autologin_handshake_reaches_ready() {
    let mut h = Harness::connect(true).await;

    h.feed("0{\"sid\":\"ZTBT5U\"}");
    assert_eq!(h.next_sent().await, "40");

    h.feed("40{\"sid\":\"ZTBT5U\"}");
    h.client.wait_ready().await.unwrap();
    assert_eq!(h.client.state(), SessionState::Ready);

    // Handshake frames still reach the general inbound stream.
    assert_eq!(h.next_inbound().await, "0{\"sid\":\"ZTBT5U\"}");
    assert_eq!(h.next_inbound().await, "40{\"sid\":\"ZTBT5U\"}");
}

#[tokio::test]
async fn without_autologin_no_login_is_sent() {
    let mut h = Harness::connect(false).await;

    h.feed("0{\"sid\":\"abc\"}");
    assert_eq!(h.next_inbound().await, "0{\"sid\":\"abc\"}");
    assert_eq!(h.client.state(), SessionState::Connected);

    // Nothing was written: the next outbound frame is the pong for a ping
    // fed afterwards.
    h.feed("2");
    assert_eq!(h.next_sent().await, "3");
}

#[tokio::test]
async fn request_resolves_on_correlated_frame_only() {
    let mut h = Harness::connect(false).await;

    let client = h.client.clone();
    let request = tokio::spawn(async move {
        client
            .request(420, Some("\"message\""), Some(json!({"text": "hi"})))
            .await
    });

    assert_eq!(h.next_sent().await, "420[\"message\",{\"text\":\"hi\"}]");

    // A frame with a different id must not settle the request.
    h.feed("431[null]");
    h.feed("430[\"message-response\",{\"delivered\":true}]");

    let payload = timeout(Duration::from_secs(1), request)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(payload, json!({"delivered": true}));
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_killing_the_loop() {
    let mut h = Harness::connect(false).await;

    h.feed("%%%not-a-frame");
    h.feed("40");

    // Loop is still alive and ordered.
    h.feed("2");
    assert_eq!(h.next_sent().await, "3");
}

#[tokio::test]
async fn disconnect_while_pending_errors_the_waiter() {
    let mut h = Harness::connect(false).await;

    let client = h.client.clone();
    let request =
        tokio::spawn(async move { client.request(420, Some("\"status\""), None).await });

    assert_eq!(h.next_sent().await, "420[\"status\"]");

    h.client.disconnect().await;

    let err = timeout(Duration::from_secs(1), request)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, AnonchatError::Connection(_)));
    assert_eq!(h.client.state(), SessionState::Disconnected);

    let err = h.client.send("421[typing]").await.unwrap_err();
    assert!(matches!(err, AnonchatError::NotConnected));
}

#[tokio::test]
async fn transport_closure_tears_the_session_down() {
    let mut h = Harness::connect(false).await;
    let client = h.client.clone();

    let request =
        tokio::spawn(async move { client.request(430, Some("\"status\""), None).await });
    assert_eq!(h.next_sent().await, "430[\"status\"]");

    // Remote end goes away: dropping the feed ends the receive stream.
    drop(h.feed);

    let err = timeout(Duration::from_secs(1), request)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, AnonchatError::Connection(_)));

    timeout(Duration::from_secs(1), async {
        loop {
            if h.client.state() == SessionState::Disconnected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session never became Disconnected");
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let h = Harness::connect(false).await;
    h.client.disconnect().await;
    h.client.disconnect().await;
    assert_eq!(h.client.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn request_raw_recovers_the_id_from_the_frame() {
    let mut h = Harness::connect(false).await;

    let client = h.client.clone();
    let request = tokio::spawn(async move {
        client.request_raw("420[\"message\",{\"text\":\"yo\"}]").await
    });

    assert_eq!(h.next_sent().await, "420[\"message\",{\"text\":\"yo\"}]");
    h.feed("430[null,[1,2,3]]");

    let payload = timeout(Duration::from_secs(1), request)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(payload, json!([1, 2, 3]));
}
