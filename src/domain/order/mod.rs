//! Order domain: resting orders and the side-partitioned order book.

mod convert;
pub mod wire;

use crate::shared::{Account, AssetSymbol, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Order ───────────────────────────────────────────────────────────────────

/// A resting order on the ledger's book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub trader: Account,
    pub side: Side,
    pub amount: Decimal,
    pub filled: Decimal,
    pub price: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn remaining(&self) -> Decimal {
        (self.amount - self.filled).max(Decimal::ZERO)
    }
}

// ─── OrderBook ───────────────────────────────────────────────────────────────

/// Resting orders of one asset, partitioned by side.
///
/// Each side keeps the ledger's ordering. Orders of other assets are never held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderBook {
    pub asset: AssetSymbol,
    pub buy: Vec<Order>,
    pub sell: Vec<Order>,
}

impl OrderBook {
    pub fn empty(asset: AssetSymbol) -> Self {
        Self {
            asset,
            buy: Vec::new(),
            sell: Vec::new(),
        }
    }

    pub fn side(&self, side: Side) -> &[Order] {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    /// The subset of this book owned by `trader`.
    pub fn for_trader(&self, trader: &Account) -> OrderBook {
        OrderBook {
            asset: self.asset.clone(),
            buy: self.buy.iter().filter(|o| &o.trader == trader).cloned().collect(),
            sell: self.sell.iter().filter(|o| &o.trader == trader).cloned().collect(),
        }
    }

    /// Highest buy price.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.buy.iter().map(|o| o.price).max()
    }

    /// Lowest sell price.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.sell.iter().map(|o| o.price).min()
    }

    pub fn len(&self) -> usize {
        self.buy.len() + self.sell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_empty() && self.sell.is_empty()
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum OrderValidationError {
    WrongAsset { expected: AssetSymbol, found: String },
    WrongSide { id: String, expected: Side },
    InvalidSide(String),
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderValidationError::WrongAsset { expected, found } => {
                write!(f, "Order for {found} in the {expected} book")
            }
            OrderValidationError::WrongSide { id, expected } => {
                write!(f, "Order {id} listed on the {expected} side with another side")
            }
            OrderValidationError::InvalidSide(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for OrderValidationError {}
