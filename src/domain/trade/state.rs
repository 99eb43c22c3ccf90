//! Trade state containers: owned by the session, updated by the stream.

use super::Trade;
use crate::shared::TradeId;

/// Append-only trade history for the lifetime of one subscription.
///
/// Keeps delivery order. Reset (not trimmed) when the subscription target changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLog {
    trades: Vec<Trade>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Most recently delivered trade.
    pub fn latest(&self) -> Option<&Trade> {
        self.trades.last()
    }

    pub fn contains(&self, trade_id: &TradeId) -> bool {
        self.trades.iter().any(|t| &t.trade_id == trade_id)
    }

    pub fn count_of(&self, trade_id: &TradeId) -> usize {
        self.trades.iter().filter(|t| &t.trade_id == trade_id).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
