//! anonchat client library entry.
//!
//! This crate wires the transport, pending-response table, session
//! lifecycle, and dispatcher into a usable async client for the chat
//! service. Protocol primitives (frame codec, correlation, errors) live in
//! `anonchat-core`.

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod pending;
pub mod transport;

pub use client::{Client, SessionState};
pub use transport::Transport;
