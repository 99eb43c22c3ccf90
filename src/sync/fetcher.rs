//! Snapshot fetcher: stateless reads against the ledger.
//!
//! Every failure is tagged with the read that failed. Nothing is retried here.

use crate::domain::asset::AssetCatalog;
use crate::domain::balance::Balance;
use crate::domain::order::OrderBook;
use crate::error::{LedgerError, LedgerReadError, ReadOp};
use crate::ledger::{Ledger, Wallet};
use crate::shared::{Account, AssetSymbol};

use futures_util::future::try_join;

/// Balances and order book of one asset, read together.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub balance: Balance,
    pub orders: OrderBook,
}

pub async fn fetch_catalog(ledger: &dyn Ledger) -> Result<AssetCatalog, LedgerReadError> {
    ledger
        .get_asset_catalog()
        .await
        .map(AssetCatalog::new)
        .map_err(|e| LedgerReadError::new(ReadOp::AssetCatalog, e))
}

pub async fn fetch_accounts(wallet: &dyn Wallet) -> Result<Vec<Account>, LedgerReadError> {
    wallet
        .accounts()
        .await
        .map_err(|e| LedgerReadError::new(ReadOp::Accounts, e))
}

pub async fn fetch_balances(
    ledger: &dyn Ledger,
    account: &Account,
    asset: &AssetSymbol,
) -> Result<Balance, LedgerReadError> {
    ledger
        .get_balance(account, asset)
        .await
        .map_err(|e| LedgerReadError::new(ReadOp::Balance, e))
}

/// Read the order book, rejecting a book that belongs to another asset.
pub async fn fetch_order_book(
    ledger: &dyn Ledger,
    asset: &AssetSymbol,
) -> Result<OrderBook, LedgerReadError> {
    let book = ledger
        .get_order_book(asset)
        .await
        .map_err(|e| LedgerReadError::new(ReadOp::OrderBook, e))?;

    if &book.asset != asset {
        return Err(LedgerReadError::new(
            ReadOp::OrderBook,
            LedgerError::InvalidResponse(format!(
                "Order book for {} returned for a {} request",
                book.asset, asset
            )),
        ));
    }
    Ok(book)
}

/// Read balances and order book concurrently; both must succeed.
pub async fn fetch_snapshot(
    ledger: &dyn Ledger,
    account: &Account,
    asset: &AssetSymbol,
) -> Result<Snapshot, LedgerReadError> {
    let (balance, orders) = try_join(
        fetch_balances(ledger, account, asset),
        fetch_order_book(ledger, asset),
    )
    .await?;

    Ok(Snapshot { balance, orders })
}
