//! Network URL constants for the DEX gateway.

/// Default REST gateway base URL (local development node).
pub const DEFAULT_API_URL: &str = "http://localhost:9545";

/// Default WebSocket URL for the trade event stream.
pub const DEFAULT_WS_URL: &str = "ws://localhost:9545/ws";
