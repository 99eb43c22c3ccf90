//! Wire types for order book responses.

use crate::shared::Account;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single resting order as returned by `GET /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResponse {
    pub id: String,
    pub trader: Account,
    /// Ledger encoding: 0 = buy, 1 = sell.
    pub side: u8,
    /// Asset symbol, plain or bytes32 hex.
    pub ticker: String,
    pub amount: Decimal,
    #[serde(default)]
    pub filled: Decimal,
    pub price: Decimal,
    /// Unix seconds.
    #[serde(default)]
    pub date: Option<i64>,
}

/// REST response for one side of the book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

/// Body of `POST /api/tx/market-order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketOrderRequest {
    pub from: Account,
    /// bytes32 hex.
    pub symbol: String,
    pub amount: Decimal,
    pub side: u8,
}

/// Body of `POST /api/tx/limit-order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitOrderRequest {
    pub from: Account,
    /// bytes32 hex.
    pub symbol: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub side: u8,
}
