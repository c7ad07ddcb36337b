//! anonchat core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contracts shared by the client crate
//! and by tooling: the outbound envelope encoder, the inbound frame decoder,
//! and the response-id correlation function. It intentionally carries no
//! transport or runtime dependencies so it can be reused in multiple
//! contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `AnonchatError`/`Result` so a
//! long-lived session never crashes on malformed traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod correlate;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{AnonchatError, Result};
