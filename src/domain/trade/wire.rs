//! Wire types for trade events delivered by the stream.

use crate::shared::serde_util::timestamp_secs;
use crate::shared::{Account, AssetSymbol, TradeId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A `NewTrade` event emitted by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeEvent {
    pub trade_id: TradeId,
    pub order_id: String,
    pub symbol: AssetSymbol,
    /// Ledger encoding: 0 = buy, 1 = sell.
    pub side: u8,
    pub trader1: Account,
    pub trader2: Account,
    pub amount: Decimal,
    pub price: Decimal,
    #[serde(with = "timestamp_secs")]
    pub date: DateTime<Utc>,
}
