//! Gateway-backed ledger: `DexClient` with its builder.
//!
//! Implements [`Ledger`] and [`Wallet`] on top of the REST gateway
//! (`LedgerHttp`) and the native trade stream (`ws::native`).

use crate::domain::asset::Asset;
use crate::domain::balance::wire::{ApproveRequest, TransferRequest};
use crate::domain::balance::Balance;
use crate::domain::order::wire::{LimitOrderRequest, MarketOrderRequest};
use crate::domain::order::OrderBook;
use crate::error::LedgerError;
use crate::http::{LedgerHttp, RetryPolicy};
use crate::ledger::{Ledger, TradeEventStream, TxReceipt, Wallet};
use crate::shared::{Account, AssetSymbol, Side};
use crate::ws::WsConfig;

use async_lock::RwLock;
use async_trait::async_trait;
use futures_util::future::try_join;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Ledger client for the DEX gateway.
#[derive(Clone)]
pub struct DexClient {
    http: LedgerHttp,
    ws_config: WsConfig,
    /// Custodian address (fixed per deployment, fetched once).
    custodian_cache: Arc<RwLock<Option<Account>>>,
}

impl DexClient {
    pub fn builder() -> DexClientBuilder {
        DexClientBuilder::default()
    }

    pub fn http(&self) -> &LedgerHttp {
        &self.http
    }

    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    pub async fn clear_cache(&self) {
        *self.custodian_cache.write().await = None;
    }
}

#[async_trait]
impl Ledger for DexClient {
    async fn get_asset_catalog(&self) -> Result<Vec<Asset>, LedgerError> {
        let resp = self.http.get_assets().await?;
        resp.assets
            .into_iter()
            .map(|a| Asset::try_from(a).map_err(|e| LedgerError::InvalidResponse(e.to_string())))
            .collect()
    }

    async fn get_balance(
        &self,
        account: &Account,
        symbol: &AssetSymbol,
    ) -> Result<Balance, LedgerError> {
        let resp = self.http.get_balance(account, symbol).await?;
        if &resp.symbol != symbol {
            return Err(LedgerError::InvalidResponse(format!(
                "Balance for {} returned for a {} request",
                resp.symbol, symbol
            )));
        }
        Ok(resp.into())
    }

    async fn get_order_book(&self, symbol: &AssetSymbol) -> Result<OrderBook, LedgerError> {
        let (buy, sell) = try_join(
            self.http.get_orders(symbol, Side::Buy),
            self.http.get_orders(symbol, Side::Sell),
        )
        .await?;

        OrderBook::try_from((symbol.clone(), buy, sell))
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }

    async fn custodian(&self) -> Result<Account, LedgerError> {
        {
            let cache = self.custodian_cache.read().await;
            if let Some(address) = cache.as_ref() {
                return Ok(address.clone());
            }
        }

        let address = self.http.get_custodian().await?.address;
        *self.custodian_cache.write().await = Some(address.clone());
        Ok(address)
    }

    async fn approve_transfer(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        spender: &Account,
    ) -> Result<TxReceipt, LedgerError> {
        let request = ApproveRequest {
            from: from.clone(),
            symbol: symbol.to_bytes32_hex(),
            amount,
            spender: spender.clone(),
        };
        self.http.approve(&request).await?.into_result()
    }

    async fn deposit(
        &self,
        from: &Account,
        amount: Decimal,
        symbol: &AssetSymbol,
    ) -> Result<TxReceipt, LedgerError> {
        let request = TransferRequest {
            from: from.clone(),
            symbol: symbol.to_bytes32_hex(),
            amount,
        };
        self.http.deposit(&request).await?.into_result()
    }

    async fn withdraw(
        &self,
        from: &Account,
        amount: Decimal,
        symbol: &AssetSymbol,
    ) -> Result<TxReceipt, LedgerError> {
        let request = TransferRequest {
            from: from.clone(),
            symbol: symbol.to_bytes32_hex(),
            amount,
        };
        self.http.withdraw(&request).await?.into_result()
    }

    async fn create_market_order(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        side: Side,
    ) -> Result<TxReceipt, LedgerError> {
        let request = MarketOrderRequest {
            from: from.clone(),
            symbol: symbol.to_bytes32_hex(),
            amount,
            side: side.as_u8(),
        };
        self.http.market_order(&request).await?.into_result()
    }

    async fn create_limit_order(
        &self,
        from: &Account,
        symbol: &AssetSymbol,
        amount: Decimal,
        price: Decimal,
        side: Side,
    ) -> Result<TxReceipt, LedgerError> {
        let request = LimitOrderRequest {
            from: from.clone(),
            symbol: symbol.to_bytes32_hex(),
            amount,
            price,
            side: side.as_u8(),
        };
        self.http.limit_order(&request).await?.into_result()
    }

    async fn subscribe_trade_events(
        &self,
        symbol: &AssetSymbol,
        from_genesis: bool,
    ) -> Result<TradeEventStream, LedgerError> {
        Ok(crate::ws::native::open_trade_stream(&self.ws_config, symbol, from_genesis).await?)
    }
}

#[async_trait]
impl Wallet for DexClient {
    async fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.http.get_accounts().await?.accounts)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct DexClientBuilder {
    base_url: String,
    ws_config: WsConfig,
    read_retry: RetryPolicy,
}

impl Default for DexClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            ws_config: WsConfig::default(),
            read_retry: RetryPolicy::None,
        }
    }
}

impl DexClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_config.url = url.to_string();
        self
    }

    pub fn ws_config(mut self, config: WsConfig) -> Self {
        self.ws_config = config;
        self
    }

    /// Retry policy for gateway reads. Writes are never retried.
    pub fn read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    pub fn build(self) -> Result<DexClient, LedgerError> {
        if !self.ws_config.url.starts_with("ws://") && !self.ws_config.url.starts_with("wss://") {
            return Err(LedgerError::InvalidResponse(format!(
                "Invalid WebSocket URL: {}",
                self.ws_config.url
            )));
        }

        Ok(DexClient {
            http: LedgerHttp::with_read_retry(&self.base_url, self.read_retry),
            ws_config: self.ws_config,
            custodian_cache: Arc::new(RwLock::new(None)),
        })
    }
}
