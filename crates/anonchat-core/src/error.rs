//! Shared error type across anonchat crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, AnonchatError>;

/// Unified error type used by core and client.
///
/// Propagation policy: protocol-level malformedness (`MalformedFrame`)
/// never terminates the session — the dispatcher logs and drops the frame.
/// Only transport-level closure ends the receive loop.
#[derive(Debug, Error)]
pub enum AnonchatError {
    /// The connection URI is not a `ws://`/`wss://` URI with a query string.
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// The query string lacks a required credential key.
    #[error("missing required query parameter: {0}")]
    MissingCredentials(&'static str),
    /// Transport open failure. Not retried internally.
    #[error("connection error: {0}")]
    Connection(String),
    /// A send was attempted without an open transport.
    #[error("not connected")]
    NotConnected,
    /// Inbound text matched none of the decodable frame shapes.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    /// A pending response was already registered for this correlation id.
    /// Programming-error condition under correct sequential usage.
    #[error("duplicate correlation id: {0}")]
    DuplicateCorrelation(u64),
}
