//! The ledger contract the sync core is driven by.
//!
//! The ledger (order matching, balance accounting, settlement) is an external,
//! trusted state machine. This module fixes the read / write / stream surface
//! the core needs from it, plus the wallet that provides authorizing accounts.
//! `DexClient` implements both against the gateway; tests use in-memory fakes.

use crate::domain::asset::Asset;
use crate::domain::balance::Balance;
use crate::domain::order::OrderBook;
use crate::domain::trade::wire::TradeEvent;
use crate::error::LedgerError;
use crate::shared::{Account, AssetSymbol, Side};

use async_trait::async_trait;
use futures_util::stream::Stream;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Live feed of trade events for one asset. Ends when the underlying
/// connection closes; an `Err` item reports why.
pub type TradeEventStream = Pin<Box<dyn Stream<Item = Result<TradeEvent, LedgerError>> + Send>>;

// ─── Transaction receipts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Confirmed,
    Reverted,
}

/// Confirmation of a ledger-mutating transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub status: TxStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TxReceipt {
    pub fn confirmed(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            status: TxStatus::Confirmed,
            reason: None,
        }
    }

    /// Turn a reverted receipt into `LedgerError::Rejected`.
    pub fn into_result(self) -> Result<TxReceipt, LedgerError> {
        match self.status {
            TxStatus::Confirmed => Ok(self),
            TxStatus::Reverted => Err(LedgerError::Rejected(
                self.reason
                    .unwrap_or_else(|| format!("transaction {} reverted", self.tx_hash)),
            )),
        }
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Read / write / stream access to the ledger.
///
/// Writes take the authorizing account and return only after confirmation.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_asset_catalog(&self) -> Result<Vec<Asset>, LedgerError>;

    async fn get_balance(
        &self,
        account: &Account,
        symbol: &AssetSymbol,
    ) -> Result<Balance, LedgerError>;

    async fn get_order_book(&self, symbol: &AssetSymbol) -> Result<OrderBook, LedgerError>;

    /// Account that custodial deposits must be approved for.
    async fn custodian(&self) -> Result<Account, LedgerError>;

    async fn approve_transfer(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        spender: &Account,
    ) -> Result<TxReceipt, LedgerError>;

    async fn deposit(
        &self,
        from: &Account,
        amount: Decimal,
        symbol: &AssetSymbol,
    ) -> Result<TxReceipt, LedgerError>;

    async fn withdraw(
        &self,
        from: &Account,
        amount: Decimal,
        symbol: &AssetSymbol,
    ) -> Result<TxReceipt, LedgerError>;

    async fn create_market_order(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        side: Side,
    ) -> Result<TxReceipt, LedgerError>;

    async fn create_limit_order(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        price: Decimal,
        side: Side,
    ) -> Result<TxReceipt, LedgerError>;

    /// Open a filtered trade stream. With `from_genesis`, historical trades
    /// are replayed before live ones.
    async fn subscribe_trade_events(
        &self,
        symbol: &AssetSymbol,
        from_genesis: bool,
    ) -> Result<TradeEventStream, LedgerError>;
}

// ─── Wallet ──────────────────────────────────────────────────────────────────

/// Identity provider. Signing authority is implied by the ledger's writes.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn accounts(&self) -> Result<Vec<Account>, LedgerError>;
}

/// A wallet with a fixed account list.
#[derive(Debug, Clone, Default)]
pub struct StaticWallet {
    accounts: Vec<Account>,
}

impl StaticWallet {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl Wallet for StaticWallet {
    async fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.accounts.clone())
    }
}
