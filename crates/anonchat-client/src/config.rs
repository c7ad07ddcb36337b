//! Service constants.

/// Base WebSocket endpoint of the chat service.
pub const BASE_URL: &str = "wss://anonchatapi.stivisto.com/socket.io/";

/// Client app version reported in the connection query string.
pub const APP_VERSION: &str = "5.23.4";

/// engine.io protocol version (`EIO` query parameter).
pub const ENGINE_VERSION: u8 = 4;

/// Transport name reported in the connection query string.
pub const TRANSPORT_NAME: &str = "websocket";
