//! Trade domain: executed trades and the per-subscription trade log.

mod convert;
pub mod state;
pub mod wire;

use crate::shared::{Account, AssetSymbol, Side, TradeId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::TradeLog;

/// An executed trade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub trade_id: TradeId,
    /// The resting order that was matched.
    pub order_id: String,
    pub asset: AssetSymbol,
    pub amount: Decimal,
    pub price: Decimal,
    pub side: Side,
    /// Ledger block time. Not monotonic across deliveries.
    pub timestamp: DateTime<Utc>,
    /// Owner of the resting order.
    pub maker: Account,
    /// Account whose order crossed the book.
    pub taker: Account,
}

impl Trade {
    pub fn involves(&self, account: &Account) -> bool {
        &self.maker == account || &self.taker == account
    }
}
