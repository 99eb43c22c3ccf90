//! WebSocket layer: trade stream messages and configuration.
//!
//! The transport lives in `native.rs` (`ws-native` feature, `tokio-tungstenite`).
//! This module defines the message types shared by the transport and its tests.

#[cfg(feature = "ws-native")]
pub mod native;

use crate::domain::trade::wire::TradeEvent;
use crate::shared::AssetSymbol;
use serde::{Deserialize, Serialize};

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MessageOut {
    #[serde(rename = "subscribe")]
    Subscribe { params: SubscribeParams },
    #[serde(rename = "ping")]
    Ping,
}

impl MessageOut {
    pub fn subscribe_trades(symbol: &AssetSymbol, from_genesis: bool) -> Self {
        MessageOut::Subscribe {
            params: SubscribeParams::Trades {
                symbol: symbol.to_bytes32_hex(),
                from_genesis,
            },
        }
    }
}

/// Channel parameters. The ledger filters trade events by bytes32 symbol.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SubscribeParams {
    #[serde(rename = "trades")]
    Trades { symbol: String, from_genesis: bool },
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Raw inbound message from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum MessageIn {
    #[serde(rename = "trade")]
    Trade { data: TradeEvent },
    #[serde(rename = "subscribed")]
    Subscribed,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "error")]
    Error(WsErrorPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsErrorPayload {
    pub message: String,
    pub code: Option<String>,
}

/// Configuration for the WS trade stream.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    pub ping_interval_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_WS_URL.to_string(),
            ping_interval_ms: 30_000,
            connect_timeout_ms: 30_000,
        }
    }
}
