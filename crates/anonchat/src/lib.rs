//! Top-level facade crate for anonchat.
//!
//! Re-exports the protocol core and the client library so users can depend
//! on a single crate.

pub mod core {
    pub use anonchat_core::*;
}

pub mod client {
    pub use anonchat_client::*;
}

pub use anonchat_client::{Client, SessionState, Transport};
pub use anonchat_core::{AnonchatError, Result};
