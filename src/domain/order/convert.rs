//! Conversion: per-side OrdersResponse pair → OrderBook (TryFrom + validation).

use super::wire::{OrderResponse, OrdersResponse};
use super::{Order, OrderBook, OrderValidationError};
use crate::shared::{AssetSymbol, Side};
use chrono::DateTime;

fn ticker_matches(ticker: &str, asset: &AssetSymbol) -> bool {
    if ticker.starts_with("0x") {
        AssetSymbol::from_bytes32_hex(ticker).is_ok_and(|s| &s == asset)
    } else {
        ticker == asset.as_str()
    }
}

fn convert_side(
    asset: &AssetSymbol,
    expected: Side,
    orders: Vec<OrderResponse>,
) -> Result<Vec<Order>, OrderValidationError> {
    orders
        .into_iter()
        .map(|o| {
            if !ticker_matches(&o.ticker, asset) {
                return Err(OrderValidationError::WrongAsset {
                    expected: asset.clone(),
                    found: o.ticker,
                });
            }
            let side = Side::try_from(o.side).map_err(OrderValidationError::InvalidSide)?;
            if side != expected {
                return Err(OrderValidationError::WrongSide { id: o.id, expected });
            }
            Ok(Order {
                id: o.id,
                trader: o.trader,
                side,
                amount: o.amount,
                filled: o.filled,
                price: o.price,
                created_at: o.date.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            })
        })
        .collect()
}

impl TryFrom<(AssetSymbol, OrdersResponse, OrdersResponse)> for OrderBook {
    type Error = OrderValidationError;

    fn try_from(
        (asset, buy, sell): (AssetSymbol, OrdersResponse, OrdersResponse),
    ) -> Result<Self, Self::Error> {
        let buy = convert_side(&asset, Side::Buy, buy.orders)?;
        let sell = convert_side(&asset, Side::Sell, sell.orders)?;
        Ok(OrderBook { asset, buy, sell })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Account;
    use rust_decimal::Decimal;

    fn resp(id: &str, side: u8, ticker: &str) -> OrderResponse {
        OrderResponse {
            id: id.to_string(),
            trader: Account::new("0xaa"),
            side,
            ticker: ticker.to_string(),
            amount: Decimal::from(100),
            filled: Decimal::ZERO,
            price: Decimal::from(5),
            date: Some(1_700_000_000),
        }
    }

    fn bat() -> AssetSymbol {
        AssetSymbol::new("BAT").unwrap()
    }

    #[test]
    fn test_book_from_both_sides() {
        let hex = bat().to_bytes32_hex();
        let book = OrderBook::try_from((
            bat(),
            OrdersResponse { orders: vec![resp("1", 0, "BAT")] },
            OrdersResponse { orders: vec![resp("2", 1, &hex)] },
        ))
        .unwrap();
        assert_eq!(book.buy.len(), 1);
        assert_eq!(book.sell.len(), 1);
        assert_eq!(book.sell[0].side, Side::Sell);
        assert!(book.sell[0].created_at.is_some());
    }

    #[test]
    fn test_foreign_asset_rejected() {
        let result = OrderBook::try_from((
            bat(),
            OrdersResponse { orders: vec![resp("1", 0, "REP")] },
            OrdersResponse::default(),
        ));
        assert!(matches!(result, Err(OrderValidationError::WrongAsset { .. })));
    }

    #[test]
    fn test_side_mismatch_rejected() {
        let result = OrderBook::try_from((
            bat(),
            OrdersResponse::default(),
            OrdersResponse { orders: vec![resp("1", 0, "BAT")] },
        ));
        assert!(matches!(result, Err(OrderValidationError::WrongSide { .. })));
    }
}
