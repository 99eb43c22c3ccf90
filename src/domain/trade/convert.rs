//! Conversion: TradeEvent → Trade.

use super::wire::TradeEvent;
use super::Trade;
use crate::shared::Side;

impl TryFrom<TradeEvent> for Trade {
    type Error = String;

    fn try_from(e: TradeEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            side: Side::try_from(e.side)?,
            trade_id: e.trade_id,
            order_id: e.order_id,
            asset: e.symbol,
            amount: e.amount,
            price: e.price,
            timestamp: e.date,
            maker: e.trader1,
            taker: e.trader2,
        })
    }
}
