//! Protocol modules (socket.io-derived text framing).
//!
//! This module hosts the wire format used by the chat service:
//! - outbound envelopes: `id`, `id[method]`, or `id[method,params]`;
//! - inbound frames: four mutually exclusive textual shapes decoded into
//!   a discriminated [`frame::InboundFrame`].
//!
//! All parsers are panic-free: malformed input is reported as
//! `AnonchatError` instead of panicking or indexing raw text, keeping the
//! receive loop resilient to hostile traffic.

pub mod envelope;
pub mod frame;

/// Keepalive ping token; answered with [`PONG`] before any decoding.
pub const PING: &str = "2";
/// Keepalive pong token.
pub const PONG: &str = "3";

/// Prefix of the unsolicited engine "open" frame.
pub const OPEN_PREFIX: &str = "0{";
/// Prefix of the namespace-connect confirmation frame.
pub const CONNECT_PREFIX: &str = "40{";
/// Bare login acknowledgment sent in reply to the open frame.
pub const LOGIN_FRAME: &str = "40";
