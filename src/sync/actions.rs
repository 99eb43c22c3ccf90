//! Actions sub-client: deposit, withdraw, market and limit orders.
//!
//! Each action runs against the selected asset as the acting account and,
//! once the ledger confirms, refreshes only the slice of the session it
//! affected. A failed write leaves the session untouched.

use crate::error::{LedgerReadError, LedgerWriteError, ReadOp, SdkError, WriteOp};
use crate::shared::Side;
use crate::sync::controller::SyncController;

use rust_decimal::Decimal;

pub struct Actions<'a> {
    pub(crate) controller: &'a SyncController,
}

impl<'a> Actions<'a> {
    /// Approve the custodian for `amount`, then move it into custody.
    /// Refreshes balances.
    pub async fn deposit(&self, amount: Decimal) -> Result<(), SdkError> {
        ensure_positive("amount", amount)?;
        let (asset, epoch) = self.controller.selected()?;
        let account = self.controller.account()?;
        let ledger = self.controller.ledger();

        let custodian = ledger
            .custodian()
            .await
            .map_err(|e| LedgerReadError::new(ReadOp::Custodian, e))?;
        ledger
            .approve_transfer(&account, &asset.symbol, amount, &custodian)
            .await
            .map_err(|e| LedgerWriteError::new(WriteOp::ApproveTransfer, e))?;
        let receipt = ledger
            .deposit(&account, amount, &asset.symbol)
            .await
            .map_err(|e| LedgerWriteError::new(WriteOp::Deposit, e))?;

        tracing::info!("Deposited {} {} ({})", amount, asset.symbol, receipt.tx_hash);
        self.controller.refresh_balances_at(&asset.symbol, epoch).await
    }

    /// Move `amount` out of custody back to the wallet. Refreshes balances.
    pub async fn withdraw(&self, amount: Decimal) -> Result<(), SdkError> {
        ensure_positive("amount", amount)?;
        let (asset, epoch) = self.controller.selected()?;
        let account = self.controller.account()?;

        let receipt = self
            .controller
            .ledger()
            .withdraw(&account, amount, &asset.symbol)
            .await
            .map_err(|e| LedgerWriteError::new(WriteOp::Withdraw, e))?;

        tracing::info!("Withdrew {} {} ({})", amount, asset.symbol, receipt.tx_hash);
        self.controller.refresh_balances_at(&asset.symbol, epoch).await
    }

    /// Cross the book for `amount` at the best available prices. Refreshes orders.
    pub async fn create_market_order(&self, amount: Decimal, side: Side) -> Result<(), SdkError> {
        ensure_positive("amount", amount)?;
        let (symbol, epoch) = self.tradable()?;
        let account = self.controller.account()?;

        let receipt = self
            .controller
            .ledger()
            .create_market_order(&account, &symbol, amount, side)
            .await
            .map_err(|e| LedgerWriteError::new(WriteOp::CreateMarketOrder, e))?;

        tracing::info!("{} market order for {} {} ({})", side, amount, symbol, receipt.tx_hash);
        self.controller.refresh_orders_at(&symbol, epoch).await
    }

    /// Rest an order of `amount` at `price`. Refreshes orders.
    pub async fn create_limit_order(
        &self,
        amount: Decimal,
        price: Decimal,
        side: Side,
    ) -> Result<(), SdkError> {
        ensure_positive("amount", amount)?;
        ensure_positive("price", price)?;
        let (symbol, epoch) = self.tradable()?;
        let account = self.controller.account()?;

        let receipt = self
            .controller
            .ledger()
            .create_limit_order(&account, &symbol, amount, price, side)
            .await
            .map_err(|e| LedgerWriteError::new(WriteOp::CreateLimitOrder, e))?;

        tracing::info!(
            "{} limit order for {} {} @ {} ({})",
            side,
            amount,
            symbol,
            price,
            receipt.tx_hash
        );
        self.controller.refresh_orders_at(&symbol, epoch).await
    }

    fn tradable(&self) -> Result<(crate::shared::AssetSymbol, u64), SdkError> {
        let session = self.controller.session();
        if !session.trading_enabled() {
            return match &session.selected {
                None => Err(SdkError::NoAssetSelected),
                Some(asset) => Err(SdkError::Validation(format!(
                    "{} is the quote asset and cannot be traded",
                    asset.ticker
                ))),
            };
        }
        let (asset, epoch) = self.controller.selected()?;
        Ok((asset.symbol, epoch))
    }
}

fn ensure_positive(field: &str, value: Decimal) -> Result<(), SdkError> {
    if value <= Decimal::ZERO {
        return Err(SdkError::Validation(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("amount", Decimal::from(1)).is_ok());
        assert!(matches!(
            ensure_positive("amount", Decimal::ZERO),
            Err(SdkError::Validation(_))
        ));
        match ensure_positive("price", Decimal::from(-3)) {
            Err(SdkError::Validation(msg)) => assert!(msg.contains("price")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
